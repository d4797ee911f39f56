// ABOUTME: Curated exercise-name alias table applied before fuzzy scoring (C3)
// ABOUTME: Maps common shorthand/slang to the canonical catalog name they should resolve to

use std::collections::HashMap;
use std::sync::OnceLock;

/// Curated normalized-name -> canonical-name substitutions, applied before
/// similarity scoring in C3 (§4.3). Short-circuits with confidence 1.0 when
/// the target is present in the catalog.
pub fn alias_map() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| {
        HashMap::from([
            ("pushups", "push up"),
            ("push up", "push up"),
            ("push ups", "push up"),
            ("pressup", "push up"),
            ("pressups", "push up"),
            ("press up", "push up"),
            ("press ups", "push up"),
            ("bench press", "barbell bench press"),
            ("bench", "barbell bench press"),
            ("flat bench press", "barbell bench press"),
            ("flat bench", "barbell bench press"),
            ("incline bench", "incline barbell bench press"),
            ("incline press", "incline barbell bench press"),
            ("decline bench", "decline barbell bench press"),
            ("decline press", "decline barbell bench press"),
            ("dumbbell bench", "dumbbell bench press"),
            ("squat", "barbell back squat"),
            ("squats", "barbell back squat"),
            ("back squat", "barbell back squat"),
            ("back squats", "barbell back squat"),
            ("front squat", "barbell front squat"),
            ("front squats", "barbell front squat"),
            ("air squat", "air squat"),
            ("bodyweight squat", "air squat"),
            ("deadlift", "barbell deadlift"),
            ("deadlifts", "barbell deadlift"),
            ("conventional deadlift", "barbell deadlift"),
            ("rdl", "romanian deadlift"),
            ("romanian dl", "romanian deadlift"),
            ("stiff leg deadlift", "romanian deadlift"),
            ("sldl", "romanian deadlift"),
            ("shoulder press", "barbell overhead press"),
            ("military press", "barbell overhead press"),
            ("strict press", "barbell overhead press"),
            ("standing press", "barbell overhead press"),
            ("dumbbell shoulder press", "dumbbell overhead press"),
            ("row", "barbell row"),
            ("rows", "barbell row"),
            ("bent over row", "barbell row"),
            ("pendlay row", "barbell row"),
            ("one arm row", "dumbbell row"),
            ("seated row", "cable row"),
            ("pullup", "pull up"),
            ("pullups", "pull up"),
            ("pull ups", "pull up"),
            ("chin up", "chin up"),
            ("chin ups", "chin up"),
            ("chinup", "chin up"),
            ("chinups", "chin up"),
            ("pulldown", "lat pulldown"),
            ("pull down", "lat pulldown"),
            ("hip thrusts", "hip thrust"),
            ("glute bridge", "glute bridge"),
            ("bridge", "glute bridge"),
            ("bicep curls", "bicep curl"),
            ("curl", "bicep curl"),
            ("curls", "bicep curl"),
            ("dumbbell curls", "dumbbell bicep curl"),
            ("alt db curl", "alternating dumbbell curl"),
            ("alt db curls", "alternating dumbbell curl"),
            ("alternating curl", "alternating dumbbell curl"),
            ("hammer curls", "hammer curl"),
            ("preacher curl", "preacher curl"),
            ("tricep extensions", "tricep extension"),
            ("skull crushers", "skull crusher"),
            ("pushdown", "tricep pushdown"),
            ("rope pushdown", "tricep pushdown"),
            ("dips", "dip"),
            ("bench dips", "bench dip"),
            ("lunges", "lunge"),
            ("walking lunges", "walking lunge"),
            ("reverse lunges", "reverse lunge"),
            ("bulgarian split squat", "bulgarian split squat"),
            ("bss", "bulgarian split squat"),
            ("planks", "plank"),
            ("side plank", "side plank"),
            ("crunches", "crunch"),
            ("sit ups", "sit up"),
            ("situp", "sit up"),
            ("situps", "sit up"),
            ("leg raises", "leg raise"),
            ("russian twists", "russian twist"),
            ("ab rollout", "ab wheel rollout"),
            ("wall balls", "wall ball"),
            ("burpees", "burpee"),
            ("box jumps", "box jump"),
            ("kettlebell swings", "kettlebell swing"),
            ("thrusters", "thruster"),
            ("power clean", "power clean"),
            ("hang clean", "hang clean"),
            ("muscle ups", "muscle up"),
            ("toes to bar", "toes to bar"),
            ("t2b", "toes to bar"),
            ("ttb", "toes to bar"),
            ("knees to elbow", "knees to elbow"),
            ("k2e", "knees to elbow"),
            ("double unders", "double under"),
            ("du", "double under"),
            ("dus", "double under"),
            ("run", "running"),
            ("jog", "running"),
            ("jogging", "running"),
            ("sprint", "running"),
            ("rowing", "rowing"),
            ("bike", "cycling"),
            ("assault bike", "assault bike"),
            ("airdyne", "assault bike"),
            ("skierg", "ski erg"),
            ("jump rope", "jump rope"),
            ("skipping", "jump rope"),
            ("stretch", "stretching"),
            ("foam roll", "foam rolling"),
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rdl_resolves_to_romanian_deadlift() {
        assert_eq!(alias_map().get("rdl"), Some(&"romanian deadlift"));
    }

    #[test]
    fn pushups_resolve_to_push_up() {
        assert_eq!(alias_map().get("pushups"), Some(&"push up"));
    }
}
