//! Static Brazilian lookup tables
//!
//! Preset city coordinates, per-state centroids and the state name to code
//! mapping used by the location resolver. All lookups go through
//! [`normalize`], so accents, spacing and case never matter.

use serde::Serialize;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::types::Coordinates;

/// State code used when a state name cannot be recognized
pub const DEFAULT_STATE_CODE: &str = "SP";

/// A Brazilian federative unit with its approximate centroid
#[derive(Debug, Clone, Copy, Serialize)]
pub struct State {
    pub code: &'static str,
    pub name: &'static str,
    #[serde(skip)]
    pub centroid: Coordinates,
}

/// A city with well-known coordinates
#[derive(Debug, Clone, Copy)]
pub struct PresetCity {
    pub name: &'static str,
    pub state_code: &'static str,
    pub coordinates: Coordinates,
}

const fn state(code: &'static str, name: &'static str, lat: f64, lon: f64) -> State {
    State {
        code,
        name,
        centroid: Coordinates { lat, lon },
    }
}

const fn city(name: &'static str, state_code: &'static str, lat: f64, lon: f64) -> PresetCity {
    PresetCity {
        name,
        state_code,
        coordinates: Coordinates { lat, lon },
    }
}

/// All 26 states plus the Federal District
pub const STATES: &[State] = &[
    state("AC", "Acre", -9.0238, -70.8120),
    state("AL", "Alagoas", -9.5713, -36.7820),
    state("AP", "Amapá", 0.9020, -52.0030),
    state("AM", "Amazonas", -3.4168, -65.8561),
    state("BA", "Bahia", -12.5797, -41.7007),
    state("CE", "Ceará", -5.4984, -39.3206),
    state("DF", "Distrito Federal", -15.7998, -47.8645),
    state("ES", "Espírito Santo", -19.1834, -40.3089),
    state("GO", "Goiás", -15.8270, -49.8362),
    state("MA", "Maranhão", -4.9609, -45.2744),
    state("MT", "Mato Grosso", -12.6819, -56.9211),
    state("MS", "Mato Grosso do Sul", -20.7722, -54.7852),
    state("MG", "Minas Gerais", -18.5122, -44.5550),
    state("PA", "Pará", -1.9981, -54.9306),
    state("PB", "Paraíba", -7.2400, -36.7820),
    state("PR", "Paraná", -25.2521, -52.0215),
    state("PE", "Pernambuco", -8.8137, -36.9541),
    state("PI", "Piauí", -7.7183, -42.7289),
    state("RJ", "Rio de Janeiro", -22.2500, -42.6600),
    state("RN", "Rio Grande do Norte", -5.4026, -36.9541),
    state("RS", "Rio Grande do Sul", -30.0346, -53.2000),
    state("RO", "Rondônia", -11.5057, -63.5806),
    state("RR", "Roraima", 2.7376, -62.0751),
    state("SC", "Santa Catarina", -27.2423, -50.2189),
    state("SP", "São Paulo", -22.1900, -48.7900),
    state("SE", "Sergipe", -10.5741, -37.3857),
    state("TO", "Tocantins", -10.1753, -48.2982),
];

/// Cities resolved without any geocoding round-trip
pub const PRESET_CITIES: &[PresetCity] = &[
    city("Porto Alegre", "RS", -30.0346, -51.2177),
    city("Caxias do Sul", "RS", -29.1678, -51.1794),
    city("Pelotas", "RS", -31.7654, -52.3376),
    city("São Paulo", "SP", -23.5505, -46.6333),
    city("Campinas", "SP", -22.9099, -47.0626),
    city("Rio de Janeiro", "RJ", -22.9068, -43.1729),
    city("Belo Horizonte", "MG", -19.9167, -43.9345),
    city("Curitiba", "PR", -25.4284, -49.2733),
    city("Florianópolis", "SC", -27.5954, -48.5480),
    city("Brasília", "DF", -15.7939, -47.8828),
    city("Goiânia", "GO", -16.6869, -49.2648),
    city("Salvador", "BA", -12.9777, -38.5016),
    city("Recife", "PE", -8.0476, -34.8770),
    city("Fortaleza", "CE", -3.7319, -38.5267),
    city("Manaus", "AM", -3.1190, -60.0217),
    city("Belém", "PA", -1.4558, -48.4902),
    city("Vitória", "ES", -20.3155, -40.3128),
    city("Cuiabá", "MT", -15.6014, -56.0979),
    city("Campo Grande", "MS", -20.4697, -54.6201),
    city("Natal", "RN", -5.7945, -35.2110),
    city("João Pessoa", "PB", -7.1195, -34.8450),
    city("Maceió", "AL", -9.6658, -35.7353),
    city("Aracaju", "SE", -10.9472, -37.0731),
    city("Teresina", "PI", -5.0892, -42.8019),
    city("São Luís", "MA", -2.5307, -44.3068),
    city("Palmas", "TO", -10.1844, -48.3336),
];

/// Strip diacritics, drop whitespace and lowercase.
///
/// `"São  Paulo"` and `"sao paulo"` both become `"saopaulo"`.
pub fn normalize(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c) && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve a state name or abbreviation to its two-letter code.
///
/// Two-character inputs are taken as codes as-is, full names go through the
/// name table, anything else falls back to [`DEFAULT_STATE_CODE`].
pub fn resolve_state_code(state: &str) -> String {
    let normalized = normalize(state);

    if normalized.chars().count() == 2 {
        return normalized.to_uppercase();
    }

    STATES
        .iter()
        .find(|s| normalize(s.name) == normalized)
        .map(|s| s.code.to_string())
        .unwrap_or_else(|| DEFAULT_STATE_CODE.to_string())
}

/// Lookup key for the preset table: `"{city}-{stateCode}"`
pub fn preset_key(city: &str, state_code: &str) -> String {
    format!("{}-{}", normalize(city), state_code.to_uppercase())
}

/// Find a preset city by name and state code
pub fn find_preset_city(city: &str, state_code: &str) -> Option<&'static PresetCity> {
    let key = preset_key(city, state_code);
    PRESET_CITIES
        .iter()
        .find(|c| preset_key(c.name, c.state_code) == key)
}

/// Find a state by its two-letter code
pub fn find_state(code: &str) -> Option<&'static State> {
    STATES.iter().find(|s| s.code.eq_ignore_ascii_case(code))
}
