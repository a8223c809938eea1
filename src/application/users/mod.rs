pub mod seed_admin;
