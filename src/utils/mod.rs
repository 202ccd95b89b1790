pub mod scan_lock;
