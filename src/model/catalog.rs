//! Static reference tables: verse counts, reciters, translations and cities

/// Number of verses in each chapter, indexed by chapter number - 1
pub const VERSE_COUNTS: [u16; 114] = [
    7, 286, 200, 176, 120, 165, 206, 75, 129, 109, 123, 111, 43, 52, 99, 128, 111, 110, 98, 135,
    112, 78, 118, 64, 77, 227, 93, 88, 69, 60, 34, 30, 73, 54, 45, 83, 182, 88, 75, 85, 54, 53,
    89, 59, 37, 35, 38, 29, 18, 45, 60, 49, 62, 55, 78, 96, 29, 22, 24, 13, 14, 11, 11, 18, 12,
    12, 30, 52, 52, 44, 28, 28, 20, 56, 40, 31, 50, 40, 46, 42, 29, 19, 36, 25, 22, 17, 19, 26,
    30, 20, 15, 21, 11, 8, 8, 19, 5, 8, 8, 11, 11, 8, 3, 9, 5, 4, 7, 3, 6, 3, 5, 4, 5, 6,
];

pub const CHAPTER_COUNT: u16 = 114;

pub fn verse_count(chapter: u16) -> Option<u16> {
    if chapter == 0 {
        return None;
    }
    VERSE_COUNTS.get(chapter as usize - 1).copied()
}

/// Position of a verse in the whole text (1..=6236), as used by per-verse CDNs
pub fn global_verse_number(chapter: u16, verse: u16) -> Option<u32> {
    let count = verse_count(chapter)?;
    if verse == 0 || verse > count {
        return None;
    }
    let preceding: u32 = VERSE_COUNTS[..chapter as usize - 1]
        .iter()
        .map(|&c| c as u32)
        .sum();
    Some(preceding + verse as u32)
}

/// How a reciter's per-verse recordings are addressed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerseSource {
    /// `everyayah.com/data/<folder>/<CCC><VVV>.mp3`
    EveryAyah(&'static str),
    /// `cdn.islamic.network/quran/audio/128/<edition>/<global>.mp3`
    IslamicNetwork,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reciter {
    pub id: &'static str,
    pub name: &'static str,
    /// Edition code used for whole-chapter recordings
    pub edition: &'static str,
    pub verse_source: VerseSource,
}

pub const RECITERS: [Reciter; 7] = [
    Reciter {
        id: "ar.alafasy",
        name: "Mishary Alafasy",
        edition: "ar.alafasy",
        verse_source: VerseSource::IslamicNetwork,
    },
    Reciter {
        id: "ar.abdulbasitmurattal",
        name: "Abdul Basit",
        edition: "ar.abdulbasitmurattal",
        verse_source: VerseSource::EveryAyah("Abdul_Basit_Murattal_192kbps"),
    },
    Reciter {
        id: "ar.minshawi",
        name: "Minshawy",
        edition: "ar.minshawi",
        verse_source: VerseSource::EveryAyah("Minshawy_Murattal_128kbps"),
    },
    Reciter {
        id: "ar.hudhaify",
        name: "Hudhaify",
        edition: "ar.hudhaify",
        verse_source: VerseSource::IslamicNetwork,
    },
    Reciter {
        id: "ar.husary",
        name: "Husary",
        edition: "ar.husary",
        verse_source: VerseSource::EveryAyah("Husary_128kbps"),
    },
    Reciter {
        id: "ar.abdurrahmaansudais",
        name: "Sudais",
        edition: "ar.abdurrahmaansudais",
        verse_source: VerseSource::EveryAyah("Abdurrahmaan_As-Sudais_192kbps"),
    },
    Reciter {
        id: "ar.saoodshuraym",
        name: "Shuraim",
        edition: "ar.saoodshuraym",
        verse_source: VerseSource::EveryAyah("Saood_ash-Shuraym_128kbps"),
    },
];

pub const DEFAULT_RECITER: &str = "ar.alafasy";

/// Unknown ids resolve to the default reciter
pub fn reciter(id: &str) -> &'static Reciter {
    RECITERS
        .iter()
        .find(|r| r.id == id)
        .unwrap_or(&RECITERS[0])
}

pub fn next_reciter(id: &str) -> &'static Reciter {
    let index = RECITERS.iter().position(|r| r.id == id).unwrap_or(0);
    &RECITERS[(index + 1) % RECITERS.len()]
}

/// Translation editions offered in the UI: (code, label)
pub const TRANSLATIONS: [(&str, &str); 8] = [
    ("en.sahih", "English - Saheeh International"),
    ("en.pickthall", "English - Pickthall"),
    ("en.yusufali", "English - Yusuf Ali"),
    ("en.asad", "English - Muhammad Asad"),
    ("ur.jalandhry", "Urdu - Jalandhry"),
    ("id.indonesian", "Indonesian - Kemenag"),
    ("fr.hamidullah", "French - Hamidullah"),
    ("tr.diyanet", "Turkish - Diyanet"),
];

pub const DEFAULT_TRANSLATION: &str = "en.sahih";

pub fn is_known_translation(code: &str) -> bool {
    TRANSLATIONS.iter().any(|(c, _)| *c == code)
}

pub fn translation_label(code: &str) -> &'static str {
    TRANSLATIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or("Unknown translation")
}

pub fn next_translation(code: &str) -> &'static str {
    let index = TRANSLATIONS.iter().position(|(c, _)| *c == code).unwrap_or(0);
    TRANSLATIONS[(index + 1) % TRANSLATIONS.len()].0
}

/// A city for prayer-time estimates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

pub const CITIES: [City; 8] = [
    City { name: "Auckland", latitude: -36.8485, longitude: 174.7633 },
    City { name: "Wellington", latitude: -41.2865, longitude: 174.7762 },
    City { name: "Christchurch", latitude: -43.5321, longitude: 172.6362 },
    City { name: "Hamilton", latitude: -37.7870, longitude: 175.2793 },
    City { name: "Tauranga", latitude: -37.6878, longitude: 176.1651 },
    City { name: "Dunedin", latitude: -45.8788, longitude: 170.5028 },
    City { name: "Palmerston North", latitude: -40.3524, longitude: 175.6082 },
    City { name: "Napier", latitude: -39.4898, longitude: 176.9130 },
];

pub const DEFAULT_CITY: &str = "Auckland";

pub fn city(name: &str) -> &'static City {
    CITIES.iter().find(|c| c.name == name).unwrap_or(&CITIES[0])
}

pub fn next_city(name: &str) -> &'static City {
    let index = CITIES.iter().position(|c| c.name == name).unwrap_or(0);
    &CITIES[(index + 1) % CITIES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_table_covers_whole_text() {
        let total: u32 = VERSE_COUNTS.iter().map(|&c| c as u32).sum();
        assert_eq!(total, 6236);
        assert_eq!(VERSE_COUNTS.len(), CHAPTER_COUNT as usize);
    }

    #[test]
    fn global_numbers_span_chapter_boundaries() {
        assert_eq!(global_verse_number(1, 1), Some(1));
        assert_eq!(global_verse_number(1, 7), Some(7));
        assert_eq!(global_verse_number(2, 1), Some(8));
        assert_eq!(global_verse_number(114, 6), Some(6236));
        assert_eq!(global_verse_number(1, 8), None);
        assert_eq!(global_verse_number(0, 1), None);
        assert_eq!(global_verse_number(115, 1), None);
    }

    #[test]
    fn unknown_ids_fall_back_to_defaults() {
        assert_eq!(reciter("7").id, DEFAULT_RECITER);
        assert_eq!(city("Paris").name, DEFAULT_CITY);
        assert!(!is_known_translation("en.saheeh"));
        assert!(is_known_translation(DEFAULT_TRANSLATION));
    }

    #[test]
    fn cycling_wraps_around() {
        let last = RECITERS[RECITERS.len() - 1].id;
        assert_eq!(next_reciter(last).id, RECITERS[0].id);
        assert_eq!(next_translation("tr.diyanet"), "en.sahih");
        assert_eq!(next_city("Napier").name, "Auckland");
    }
}
