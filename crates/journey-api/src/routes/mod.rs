pub mod health;
pub mod leads;
pub mod openapi;
pub mod pages;
pub mod threads;
