//! some linear algebra functions used throughout the code
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// direct solvers for dense linear systems (Newton step)
pub mod linear_solvers;
/// diagnostics for linear systems and matrices: if it is singular
/// or poorly conditioned, spectral bounds
pub mod linear_sys_diagnostics;
