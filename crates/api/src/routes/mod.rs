pub mod networks;
