mod data_output;
mod output_writer;

pub use data_output::DataOutput;
pub use output_writer::OutputWriter;
