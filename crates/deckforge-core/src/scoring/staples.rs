/// Widely played cards that earn a power bonus and win ranking ties.
const KNOWN_STAPLES: [&str; 40] = [
    "Sol Ring",
    "Arcane Signet",
    "Command Tower",
    "Mind Stone",
    "Fellwar Stone",
    "Commander's Sphere",
    "Talisman of Dominance",
    "Cultivate",
    "Kodama's Reach",
    "Rampant Growth",
    "Farseek",
    "Nature's Lore",
    "Three Visits",
    "Llanowar Elves",
    "Birds of Paradise",
    "Swords to Plowshares",
    "Path to Exile",
    "Beast Within",
    "Chaos Warp",
    "Generous Gift",
    "Counterspell",
    "Swan Song",
    "Cyclonic Rift",
    "Rhystic Study",
    "Mystic Remora",
    "Phyrexian Arena",
    "Sylvan Library",
    "Harmonize",
    "Night's Whisper",
    "Read the Bones",
    "Lightning Greaves",
    "Swiftfoot Boots",
    "Heroic Intervention",
    "Teferi's Protection",
    "Demonic Tutor",
    "Vampiric Tutor",
    "Eternal Witness",
    "Reanimate",
    "Bojuka Bog",
    "Rest in Peace",
];

pub fn is_known_staple(name: &str) -> bool {
    KNOWN_STAPLES.contains(&name)
}
