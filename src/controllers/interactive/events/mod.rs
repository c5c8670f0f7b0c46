pub mod update_status;
