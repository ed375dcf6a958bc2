// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for the template interpreter.

use parley_template::{Renderer, render};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn sample_data() -> Map<String, Value> {
    match json!({"name": "Ada", "items": [1, 2, 3], "n": 5}) {
        Value::Object(m) => m,
        _ => Map::new(),
    }
}

proptest! {
    #[test]
    fn text_without_tags_renders_unchanged(s in "\\PC*") {
        prop_assume!(!s.contains("{{"));
        prop_assert_eq!(render(&s, &sample_data()), s);
    }

    #[test]
    fn loop_renders_once_per_element_up_to_cap(len in 0usize..120, cap in 1usize..60) {
        let items: Vec<usize> = (0..len).collect();
        let mut data = Map::new();
        data.insert("xs".into(), json!(items));
        let out = Renderer::new(cap).render("{{for x in xs}}#{{endfor}}", &data);
        prop_assert_eq!(out.len(), len.min(cap));
    }

    #[test]
    fn rendering_never_panics(s in "[a-z{}\\[\\]. _0-9=<>!']{0,64}") {
        let _ = render(&s, &sample_data());
    }
}
