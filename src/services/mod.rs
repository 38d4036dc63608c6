// Fleet
pub mod carts;

// Chemical inventory
pub mod inventory;

// Workers and attendance
pub mod workforce;

// Financial services
pub mod invoicing;

// Analytics and reporting
pub mod reports;
