pub mod iface;
pub mod retry;
pub mod tfe;
