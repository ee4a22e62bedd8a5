pub mod check;
pub mod concat;
pub mod files;
pub mod rules;
pub mod scan;
