use std::collections::HashMap;

pub fn builtin_encounters() -> HashMap<&'static str, &'static str> {
    HashMap::from([(
        "goblin_warband",
        include_str!("../content/encounters/goblin_warband.json"),
    )])
}
