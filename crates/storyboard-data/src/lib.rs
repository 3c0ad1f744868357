// storyboard-data: plain structs and enums for the storyboard script's data model
pub mod model;
