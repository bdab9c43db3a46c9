pub mod absence_sweep;
