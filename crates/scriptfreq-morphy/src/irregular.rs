//! Irregular verb forms shared by lemmatization and citation highlighting.
//!
//! Lemmatization reads the table inverted (`went` -> `go`); highlighting reads
//! it forwards to find every surface form of a lemma inside a sentence.

/// Base verb followed by every inflected form that maps back to it.
pub const IRREGULAR_VERBS: &[(&str, &[&str])] = &[
    ("be", &["am", "is", "are", "was", "were", "be", "been", "being"]),
    ("have", &["have", "has", "had", "having"]),
    ("do", &["do", "does", "did", "doing", "done"]),
    ("go", &["go", "goes", "went", "gone", "going"]),
    ("come", &["come", "comes", "came", "coming"]),
    ("see", &["see", "sees", "saw", "seen", "seeing"]),
    ("say", &["say", "says", "said", "saying"]),
    ("get", &["get", "gets", "got", "getting", "gotten"]),
    ("make", &["make", "makes", "made", "making"]),
    ("take", &["take", "takes", "took", "taking", "taken"]),
    ("know", &["know", "knows", "knew", "knowing", "known"]),
    ("think", &["think", "thinks", "thought", "thinking"]),
    ("tell", &["tell", "tells", "told", "telling"]),
    ("become", &["become", "becomes", "became", "becoming"]),
    ("leave", &["leave", "leaves", "left", "leaving"]),
    ("feel", &["feel", "feels", "felt", "feeling"]),
    ("put", &["put", "puts", "putting"]),
    ("bring", &["bring", "brings", "brought", "bringing"]),
    ("begin", &["begin", "begins", "began", "beginning", "begun"]),
    ("keep", &["keep", "keeps", "kept", "keeping"]),
    ("hold", &["hold", "holds", "held", "holding"]),
    ("write", &["write", "writes", "wrote", "writing", "written"]),
    ("stand", &["stand", "stands", "stood", "standing"]),
    ("hear", &["hear", "hears", "heard", "hearing"]),
    ("let", &["let", "lets", "letting"]),
    ("mean", &["mean", "means", "meant", "meaning"]),
    ("set", &["set", "sets", "setting"]),
    ("meet", &["meet", "meets", "met", "meeting"]),
    ("run", &["run", "runs", "ran", "running"]),
    ("pay", &["pay", "pays", "paid", "paying"]),
    ("sit", &["sit", "sits", "sat", "sitting"]),
    ("speak", &["speak", "speaks", "spoke", "speaking", "spoken"]),
    ("lie", &["lie", "lies", "lay", "lying", "lain"]),
    ("lead", &["lead", "leads", "led", "leading"]),
    ("read", &["read", "reads", "reading"]),
    ("grow", &["grow", "grows", "grew", "growing", "grown"]),
    ("lose", &["lose", "loses", "lost", "losing"]),
    ("fall", &["fall", "falls", "fell", "falling", "fallen"]),
    ("send", &["send", "sends", "sent", "sending"]),
    ("build", &["build", "builds", "built", "building"]),
    (
        "understand",
        &["understand", "understands", "understood", "understanding"],
    ),
    ("draw", &["draw", "draws", "drew", "drawing", "drawn"]),
    ("break", &["break", "breaks", "broke", "breaking", "broken"]),
    ("spend", &["spend", "spends", "spent", "spending"]),
    ("cut", &["cut", "cuts", "cutting"]),
    ("rise", &["rise", "rises", "rose", "rising", "risen"]),
    ("drive", &["drive", "drives", "drove", "driving", "driven"]),
    ("buy", &["buy", "buys", "bought", "buying"]),
    ("wear", &["wear", "wears", "wore", "wearing", "worn"]),
    ("choose", &["choose", "chooses", "chose", "choosing", "chosen"]),
    ("eat", &["eat", "eats", "ate", "eating", "eaten"]),
    ("sleep", &["sleep", "sleeps", "slept", "sleeping"]),
    ("sing", &["sing", "sings", "sang", "singing", "sung"]),
    ("swim", &["swim", "swims", "swam", "swimming", "swum"]),
    ("fly", &["fly", "flies", "flew", "flying", "flown"]),
    ("teach", &["teach", "teaches", "taught", "teaching"]),
    ("sell", &["sell", "sells", "sold", "selling"]),
    ("catch", &["catch", "catches", "caught", "catching"]),
    ("fight", &["fight", "fights", "fought", "fighting"]),
    ("throw", &["throw", "throws", "threw", "throwing", "thrown"]),
    ("show", &["show", "shows", "showed", "showing", "shown"]),
    ("forget", &["forget", "forgets", "forgot", "forgetting", "forgotten"]),
    ("forgive", &["forgive", "forgives", "forgave", "forgiving", "forgiven"]),
    ("shake", &["shake", "shakes", "shook", "shaking", "shaken"]),
    ("shut", &["shut", "shuts", "shutting"]),
    ("ring", &["ring", "rings", "rang", "ringing", "rung"]),
];

/// Inflected forms listed for `base`, if it is an irregular verb.
pub fn irregular_forms(base: &str) -> Option<&'static [&'static str]> {
    IRREGULAR_VERBS
        .iter()
        .find(|(verb, _)| *verb == base)
        .map(|(_, forms)| *forms)
}

/// Every surface form worth looking for when citing `lemma`.
///
/// Irregular verbs list their own forms; everything else gets the regular
/// `-s`, `-es`, `-ed` and `-ing` variants.
pub fn surface_forms(lemma: &str) -> Vec<String> {
    let base = lemma.trim().to_lowercase();
    if let Some(forms) = irregular_forms(&base) {
        return forms.iter().map(|f| f.to_string()).collect();
    }
    ["", "s", "es", "ed", "ing"]
        .iter()
        .map(|suffix| format!("{base}{suffix}"))
        .collect()
}

/// `(form, base)` pairs for every inflected form that differs from its base.
pub(crate) fn inverted() -> impl Iterator<Item = (&'static str, &'static str)> {
    IRREGULAR_VERBS.iter().flat_map(|(base, forms)| {
        forms
            .iter()
            .filter(move |form| *form != base)
            .map(move |form| (*form, *base))
    })
}
