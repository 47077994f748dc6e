pub mod print_job;
pub mod print_job_log;
pub mod printer;

pub use print_job::Entity as PrintJob;
pub use print_job_log::Entity as PrintJobLog;
pub use printer::Entity as Printer;
