// tools/mod.rs
// Companion tools that work on other tables than the reflex list

pub mod cognates; // Cognate sets attested in a subgroup
pub mod taxa; // Nexus taxset blocks
