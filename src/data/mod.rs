pub mod column_index;
pub mod csv_line;
pub mod forecast_record;
pub mod parseable_data_record;
