//! Static table of supplications shown on the Duas tab

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dua {
    pub arabic: &'static str,
    pub english: &'static str,
    pub category: &'static str,
    pub reference: &'static str,
}

pub const DUAS: [Dua; 9] = [
    Dua {
        arabic: "الْحَمْدُ لِلَّهِ الَّذِي أَطْعَمَنِي هَذَا وَرَزَقَنِيهِ مِنْ غَيْرِ حَوْلٍ مِنِّي وَلَا قُوَّةٍ",
        english: "Praise is to Allah Who has given me this food and sustained me with it though I was unable to do it and had no power.",
        category: "After Eating",
        reference: "Tirmidhi",
    },
    Dua {
        arabic: "بِسْمِ اللَّهِ تَوَكَّلْتُ عَلَى اللَّهِ، لَا حَوْلَ وَلَا قُوَّةَ إِلَّا بِاللَّهِ",
        english: "In the name of Allah, I place my trust in Allah, and there is no might nor power except with Allah.",
        category: "Leaving Home",
        reference: "Tirmidhi",
    },
    Dua {
        arabic: "اللَّهُمَّ إِنِّي أَعُوذُ بِكَ مِنَ الْهَمِّ وَالْحَزَنِ، وَأَعُوذُ بِكَ مِنَ الْعَجْزِ وَالْكَسَلِ، وَأَعُوذُ بِكَ مِنَ الْجُبْنِ وَالْبُخْلِ، وَأَعُوذُ بِكَ مِنْ غَلَبَةِ الدَّيْنِ، وَقَهْرِ الرِّجَالِ",
        english: "O Allah, I seek refuge in You from anxiety and sorrow, weakness and laziness, miserliness and cowardice, the burden of debts and being overpowered by men.",
        category: "Anxiety and Sorrow",
        reference: "Bukhari",
    },
    Dua {
        arabic: "رَبَّنَا آتِنَا فِي الدُّنْيَا حَسَنَةً وَفِي الْآخِرَةِ حَسَنَةً وَقِنَا عَذَابَ النَّارِ",
        english: "Our Lord, grant us good in this world and good in the Hereafter, and save us from the punishment of the Fire.",
        category: "Comprehensive Dua",
        reference: "Quran 2:201",
    },
    Dua {
        arabic: "اللَّهُمَّ إِنِّي أَسْأَلُكَ الْهُدَى وَالتُّقَى، وَالْعَفَافَ وَالْغِنَى",
        english: "O Allah, I ask You for guidance, piety, chastity, and self-sufficiency.",
        category: "Daily Supplication",
        reference: "Muslim",
    },
    Dua {
        arabic: "سُبْحَانَ اللَّهِ وَبِحَمْدِهِ، عَدَدَ خَلْقِهِ، وَرِضَا نَفْسِهِ، وَزِنَةَ عَرْشِهِ، وَمِدَادَ كَلِمَاتِهِ",
        english: "Glory is to Allah and praise is to Him, by the number of His creation, by His pleasure, by the weight of His Throne, and by the ink of His words.",
        category: "Morning and Evening",
        reference: "Muslim",
    },
    Dua {
        arabic: "اللَّهُمَّ بَارِكْ لَهُمْ فِي مَا رَزَقْتَهُمْ، وَاغْفِرْ لَهُمْ وَارْحَمْهُمْ",
        english: "O Allah, bless them in what You have provided for them, and forgive them and have mercy on them.",
        category: "For Others",
        reference: "Muslim",
    },
    Dua {
        arabic: "اللَّهُمَّ اغْفِرْ لِي ذَنْبِي كُلَّهُ، دِقَّهُ وَجِلَّهُ، وَأَوَّلَهُ وَآخِرَهُ، وَعَلَانِيَتَهُ وَسِرَّهُ",
        english: "O Allah, forgive me all my sins, small and large, first and last, open and secret.",
        category: "Forgiveness",
        reference: "Muslim",
    },
    Dua {
        arabic: "اللَّهُمَّ إِنِّي أَعُوذُ بِكَ مِنْ شَرِّ نَفْسِي، وَمِنْ شَرِّ كُلِّ دَابَّةٍ أَنْتَ آخِذٌ بِنَاصِيَتِهَا",
        english: "O Allah, I seek refuge in You from the evil of myself and from the evil of every creature You grasp by its forelock.",
        category: "Protection",
        reference: "Tirmidhi",
    },
];

/// Case-insensitive match on category, translation or reference; empty query matches all
pub fn search(query: &str) -> Vec<&'static Dua> {
    let query = query.trim().to_lowercase();
    DUAS.iter()
        .filter(|d| {
            query.is_empty()
                || d.category.to_lowercase().contains(&query)
                || d.english.to_lowercase().contains(&query)
                || d.reference.to_lowercase().contains(&query)
                || d.arabic.contains(query.as_str())
        })
        .collect()
}
