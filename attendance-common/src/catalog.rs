//! Module catalog
//!
//! Static mapping from academic year (`"1"`..`"5"`) to the ordered list of
//! modules whose attendance datasets exist. Treated as configuration, never
//! fetched remotely.

use crate::{Error, Result};
use serde::Serialize;

/// One module offered in an academic year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
    /// Identifier used in dataset file names (e.g. `Introduction_to_Anatomy`)
    pub id: &'static str,
    /// Human-readable module name
    pub name: &'static str,
}

const fn module(id: &'static str, name: &'static str) -> ModuleDescriptor {
    ModuleDescriptor { id, name }
}

const YEAR_1: &[ModuleDescriptor] = &[
    module("Introduction_to_Anatomy", "Introduction to Anatomy"),
    module("Introduction_to_Histology", "Introduction to Histology"),
    module("Introduction_to_Biochemistry", "Introduction to Biochemistry"),
    module("Introduction_to_Physiology", "Introduction to Physiology"),
    module("Immunology", "Immunology"),
    module("Genetics", "Genetics"),
    module("Introduction_to_Pathology", "Introduction to Pathology"),
    module("Introduction_to_Pharmacology", "Introduction to Pharmacology"),
    module("Infection", "Infection"),
    module("Locomotor", "Locomotor"),
];

const YEAR_2: &[ModuleDescriptor] = &[
    module("Blood_&_lymphatics", "Blood & Lymphatics"),
    module("Respiratory", "Respiratory"),
    module("CVS", "CVS"),
    module("CNS", "CNS"),
    module("Special_senses", "Special Senses"),
    module("Endocrine_&_Metabolism", "Endocrine & Metabolism"),
];

const YEAR_3: &[ModuleDescriptor] = &[
    module("GIT_&_Liver", "GIT & Liver"),
    module("Urogenital", "Urogenital"),
    module("Foundation_of_internal", "Foundation of Internal"),
    module("ENT", "ENT"),
    module("Community_&_Occupational", "Community & Occupational"),
    module("Forensics_&_Toxicology", "Forensics & Toxicology"),
];

const YEAR_4: &[ModuleDescriptor] = &[
    module("General_&_special_internal_1", "General & Special Internal 1"),
    module("General_&_special_internal_2", "General & Special Internal 2"),
    module("Family_Medicine", "Family Medicine"),
    module("Pediatrics", "Pediatrics"),
];

const YEAR_5: &[ModuleDescriptor] = &[
    module("Ophthalmology", "Ophthalmology"),
    module("General_&_Special_surgery_1", "General & Special Surgery 1"),
    module("General_&_Special_surgery_2", "General & Special Surgery 2"),
    module("Emergency_&_trauma_1", "Emergency & Trauma 1"),
    module("Emergency_&_trauma_2", "Emergency & Trauma 2"),
    module("Obstetrics_&_gynecology", "Obstetrics & Gynecology"),
];

/// Academic years that have a module list
pub const ACADEMIC_YEARS: &[&str] = &["1", "2", "3", "4", "5"];

/// Modules for an academic year, in display order.
///
/// Unknown years yield an empty slice.
pub fn modules_for(academic_year: &str) -> &'static [ModuleDescriptor] {
    match academic_year.trim() {
        "1" => YEAR_1,
        "2" => YEAR_2,
        "3" => YEAR_3,
        "4" => YEAR_4,
        "5" => YEAR_5,
        _ => &[],
    }
}

/// Look up a module by id within a year
pub fn find(academic_year: &str, module_id: &str) -> Option<&'static ModuleDescriptor> {
    modules_for(academic_year)
        .iter()
        .find(|m| m.id == module_id.trim())
}

/// Look up a module, failing with a descriptive error when absent
pub fn require(academic_year: &str, module_id: &str) -> Result<&'static ModuleDescriptor> {
    if modules_for(academic_year).is_empty() {
        return Err(Error::InvalidInput(format!(
            "Unknown academic year '{}' (expected one of {})",
            academic_year,
            ACADEMIC_YEARS.join(", ")
        )));
    }

    find(academic_year, module_id).ok_or_else(|| {
        Error::NotFound(format!(
            "Module '{}' is not offered in year {}",
            module_id, academic_year
        ))
    })
}
