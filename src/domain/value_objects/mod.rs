//! Small immutable types shared by the domain: backend kinds, branch names and resolved points.

pub mod branch_name;
pub mod reference_point;
pub mod scm_type;
