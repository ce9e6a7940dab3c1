pub mod format;
pub mod hijri;
pub mod qibla;
pub mod time;
