pub mod giving;
