//! Record type definitions
//!
//! QMT manages the following QMS record families:
//!
//! **Organisation:**
//! - [`Organisation`] - the owning entity, with embedded locations,
//!   departments, roles, SWOT/PESTLE entries, scope statement and memberships
//! - [`Stakeholder`] - interested parties with their requirements
//! - [`Employee`] - organisational staff records
//!
//! **Leadership:**
//! - [`Commitment`] - leadership commitments with accountability
//!   assignments, objectives, actions, reviews, communications, attachments
//! - [`QualityPolicy`] - the quality policy with its communications and evidence
//!
//! **Planning:**
//! - [`Risk`] / [`Opportunity`] - two-factor assessments with a derived score
//! - [`Response`] - planned responses to risks and opportunities
//! - [`QmsChange`] - change requests with control records
//!
//! **Operation:**
//! - [`Sop`], [`ContractReview`], [`DesignProject`], [`SupplierEvaluation`],
//!   [`ServiceReport`], [`ProductRelease`], [`Nonconformance`]
//!
//! **Support:**
//! - [`ResourcePlan`], [`TrainingRecord`], [`AwarenessRecord`],
//!   [`CommunicationPlan`], [`DocumentRegister`]

pub mod awareness_record;
pub mod change;
pub mod commitment;
pub mod communication_plan;
pub mod contract_review;
pub mod design_project;
pub mod document_register;
pub mod employee;
pub mod ncr;
pub mod opportunity;
pub mod organisation;
pub mod policy;
pub mod product_release;
pub mod resource_plan;
pub mod response;
pub mod risk;
pub mod service_report;
pub mod sop;
pub mod stakeholder;
pub mod supplier_evaluation;
pub mod training_record;

pub use awareness_record::AwarenessRecord;
pub use change::QmsChange;
pub use commitment::Commitment;
pub use communication_plan::CommunicationPlan;
pub use contract_review::ContractReview;
pub use design_project::DesignProject;
pub use document_register::DocumentRegister;
pub use employee::Employee;
pub use ncr::Nonconformance;
pub use opportunity::Opportunity;
pub use organisation::Organisation;
pub use policy::QualityPolicy;
pub use product_release::ProductRelease;
pub use resource_plan::ResourcePlan;
pub use response::Response;
pub use risk::Risk;
pub use service_report::ServiceReport;
pub use sop::Sop;
pub use stakeholder::Stakeholder;
pub use supplier_evaluation::SupplierEvaluation;
pub use training_record::TrainingRecord;
