pub mod links;
pub mod sections;
