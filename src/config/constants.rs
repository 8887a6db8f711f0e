// src/config/constants.rs

/// Max number of queries kept in the query history
pub const MAX_QUERY_HISTORY_LENGTH: usize = 20;

/// Number of table rows revealed at once
pub const RESULTS_INCREMENT: usize = 100;

/// Below this many distinct values a variable is treated as categorical
pub const CATEGORICAL_THRESHOLD: usize = 10;

/// Category offered before the category list has been fetched
pub const DEFAULT_CATEGORY: &str = "Nuclear";

/// Raw sample identifier column in scatter rows
pub const CELL_LINE_COLUMN: &str = "cell_lines";

/// Alias column inserted next to `cell_lines` in row exports
pub const CELL_LINE_ALIAS_COLUMN: &str = "Cell Line ID";

/// DepMap id to human-readable cell line name
const DEPMAP_TO_CELL_LINE: &[(&str, &str)] = &[
    ("ACH-000001", "NIHOVCAR3"),
    ("ACH-000048", "TOV112D"),
    ("ACH-000091", "OV56"),
    ("ACH-000116", "OAW28"),
    ("ACH-000123", "COV434"),
    ("ACH-000132", "JHOS2"),
    ("ACH-000237", "JHOM1"),
    ("ACH-000256", "COV318"),
    ("ACH-000278", "COV362"),
    ("ACH-000291", "OV90"),
    ("ACH-000324", "JHOC5"),
    ("ACH-000409", "OVSAHO"),
    ("ACH-000430", "TYKNU"),
    ("ACH-000443", "OVKATE"),
    ("ACH-000460", "SNU8"),
    ("ACH-000524", "KURAMOCHI"),
    ("ACH-000527", "OVISE"),
    ("ACH-000542", "HEYA8"),
    ("ACH-000574", "FUOV1"),
    ("ACH-000608", "COV644"),
    ("ACH-000617", "OVCAR4"),
    ("ACH-000646", "OVMANA"),
    ("ACH-000657", "A2780"),
    ("ACH-000663", "OVTOKO"),
    ("ACH-000688", "OV7"),
    ("ACH-000696", "OVCAR8"),
    ("ACH-000701", "RMUGS"),
    ("ACH-000704", "OAW42"),
    ("ACH-000713", "CAOV3"),
    ("ACH-000719", "RMGI"),
    ("ACH-000796", "MCAS"),
    ("ACH-000811", "SKOV3"),
    ("ACH-000885", "TOV21G"),
    ("ACH-000906", "ES2"),
    ("ACH-000947", "OVK18"),
    ("ACH-001042", "COLO704"),
    ("ACH-001048", "COV504"),
    ("ACH-001063", "DOV13"),
    ("ACH-001151", "OVCAR5"),
    ("ACH-001278", "BIN67"),
    ("ACH-001374", "PA1"),
    ("ACH-001403", "TO14"),
    ("ACH-001418", "UWB1289"),
    ("ACH-001628", "PEA1"),
    ("ACH-001630", "PEO1"),
    ("ACH-001632", "PEO4"),
    ("ACH-002140", "HEY"),
    ("ACH-002149", "KGN"),
    ("ACH-002181", "OVCA420"),
    ("ACH-002182", "OVCA433"),
];

/// Resolve a DepMap id (e.g. `ACH-000657`) to its cell line name
pub fn cell_line_name(depmap_id: &str) -> Option<&'static str> {
    DEPMAP_TO_CELL_LINE
        .binary_search_by(|(id, _)| (*id).cmp(depmap_id))
        .ok()
        .map(|idx| DEPMAP_TO_CELL_LINE[idx].1)
}
