pub mod eos80;
