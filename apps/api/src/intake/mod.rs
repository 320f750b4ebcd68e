// Form intake: raw job-application form fields and their validation.
// Produces a `JobDetails` value that the generator can trust.

pub mod validation;

pub use validation::{JobDetails, JobDetailsForm};
