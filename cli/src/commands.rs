pub mod download;
pub mod run;
