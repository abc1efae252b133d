pub mod rtu;
