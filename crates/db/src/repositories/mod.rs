mod outcome_repo;
mod template_repo;

pub use outcome_repo::OutcomeRepo;
pub use template_repo::TemplateRepo;
