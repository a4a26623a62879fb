pub mod sanction_sweep;
