// tools/cognates.rs
// Cognate sets attested in a language subgroup
// Input is an ABVD export: one word per row, with language, comma-separated cognate sets and a loan flag

use crate::error::Result;
use crate::pipeline::ingest::require_columns;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// ABVD language names of the Formosan languages
pub const FORMOSAN: &[&str] = &[
    "Amis_Central_350",
    "Amis_Farang_800",
    "Amis_Fataan_799",
    "Atayal_Culi_F69_Bandai_256",
    "Atayal_Culi_L04_Mayrinax_742",
    "Atayal_Culi_L04_Skikun_802",
    "Atayal_Squliq_F69_255",
    "Atayal_Squliq_L04_819",
    "Babuza_Ts82_635",
    "Basay_L04_832",
    "Basay_Tsym91_369",
    "Bunun_F69_Southern_202",
    "Bunun_Iskubun_805",
    "Bunun_Takbanuaz_804",
    "Bunun_Takituduh_L04_803",
    "Bunun_Takituduh_L88_726",
    "Favorlang_F69_257",
    "Favorlang_Ol03_831",
    "Hoanya_Ts82_636",
    "Kanakanabu_F69_203",
    "Kanakanabu_L04_825",
    "Kavalan_F69_260",
    "Kavalan_Lts_720",
    "Paiwan_Butanglu_L04_806",
    "Paiwan_Kulalao_F82_177",
    "Paiwan_Stimul_L04_807",
    "Paiwan_Tjatjigel_Egli_1328",
    "Paiwan_Tjubar_L04_808",
    "Papora_Ts82_637",
    "Pazih_F69_266",
    "Pazih_Lts_Auran_760",
    "Puyuma_Chihpen_F69_271",
    "Puyuma_Katipul_L04_811",
    "Puyuma_Lower_Pinlang_L04_810",
    "Puyuma_Nanwang_Cq_759",
    "Puyuma_Pilam_L04_809",
    "Rukai_Budai_F69_272",
    "Rukai_Budai_L04_813",
    "Rukai_Maga_L04_814",
    "Rukai_Mantauran_L04_816",
    "Rukai_Tanan_L04_812",
    "Rukai_Tona_815",
    "Saaroa_F69_273",
    "Saaroa_L04_826",
    "Saisiyat_F69_274",
    "Saisiyat_L04_Taai_818",
    "Saisiyat_L04_Tungho_817",
    "Sakizaya_801",
    "Seediq_F69_Sakura_275",
    "Seediq_L04_Hecuo_822",
    "Seediq_L04_Paran_820",
    "Seediq_L04_Toda_821",
    "Seediq_L04_Truku_823",
    "Siraya_A_1516",
    "Siraya_F69_276",
    "Siraya_Gospel_Dialect_1519",
    "Siraya_Um_Utrecht_Manuscript_Dialect_1517",
    "Taokas_Ts82_638",
    "Thao_B96_241",
    "Tsou_Duhtu_L04_824",
    "Tsou_T63_138",
];

#[derive(Debug, Clone, PartialEq)]
pub struct CognateRow {
    pub language: String,
    pub cognacy: Vec<String>,
}

/// Load a cognate file, keeping only inherited (non-loan) words
pub fn load(path: impl AsRef<Path>) -> Result<Vec<CognateRow>> {
    let path = path.as_ref();
    let rows = read_cognates(std::fs::File::open(path)?, &path.display().to_string())?;
    info!("Loaded {} inherited words from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn read_cognates<R: Read>(reader: R, origin: &str) -> Result<Vec<CognateRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let [language_idx, cognacy_idx, loan_idx] =
        require_columns(&headers, ["Language", "Cognacy", "Loan"], origin)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.get(loan_idx).map(str::trim) != Some("0") {
            continue;
        }
        rows.push(CognateRow {
            language: record.get(language_idx).unwrap_or("").trim().to_string(),
            cognacy: split_sets(record.get(cognacy_idx).unwrap_or("")),
        });
    }
    Ok(rows)
}

fn split_sets(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every cognate set attested in `rows`
pub fn all_sets(rows: &[CognateRow]) -> BTreeSet<String> {
    rows.iter().flat_map(|r| r.cognacy.iter().cloned()).collect()
}

/// Cognate sets attested for each language
pub fn cognates_for_language(rows: &[CognateRow]) -> BTreeMap<String, BTreeSet<String>> {
    let mut result: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for row in rows {
        result
            .entry(row.language.clone())
            .or_default()
            .extend(row.cognacy.iter().cloned());
    }
    result
}

/// Cognate sets attested in at least one language of `languages`
pub fn subgroup_sets(
    by_language: &BTreeMap<String, BTreeSet<String>>,
    languages: &[&str],
) -> BTreeSet<String> {
    let mut result = BTreeSet::new();
    for language in languages {
        match by_language.get(*language) {
            Some(sets) => result.extend(sets.iter().cloned()),
            None => warn!(language = *language, "subgroup language not found in cognate data"),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "Language\tWord\tCognacy\tLoan\n\
                        Amis_Central_350\teye\t1, 2\t0\n\
                        Amis_Central_350\tstone\t5\t0\n\
                        Tagalog_1\teye\t1\t0\n\
                        Tagalog_1\tstone\t9\t0\n\
                        Thao_B96_241\tdog\t7\t1\n\
                        Thao_B96_241\thand\t\t0\n";

    #[test]
    fn loans_are_excluded() {
        let rows = read_cognates(DATA.as_bytes(), "abvd").unwrap();
        assert_eq!(rows.len(), 5);
        assert!(!all_sets(&rows).contains("7"));
    }

    #[test]
    fn sets_per_language() {
        let rows = read_cognates(DATA.as_bytes(), "abvd").unwrap();
        let by_language = cognates_for_language(&rows);

        let amis: Vec<_> = by_language["Amis_Central_350"].iter().cloned().collect();
        assert_eq!(amis, vec!["1", "2", "5"]);
        assert!(by_language["Thao_B96_241"].is_empty());
    }

    #[test]
    fn formosan_subgroup() {
        let rows = read_cognates(DATA.as_bytes(), "abvd").unwrap();
        let sets = subgroup_sets(&cognates_for_language(&rows), FORMOSAN);
        assert_eq!(sets.into_iter().collect::<Vec<_>>(), vec!["1", "2", "5"]);
    }

    #[test]
    fn missing_columns() {
        let err = read_cognates("Language\tCognacy\n".as_bytes(), "abvd").unwrap_err();
        assert!(err.to_string().contains("Loan"));
    }
}
