use std::any::Any;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tandem::managers::{ShareError, ShareKey, Shareable};
use tandem::prelude::*;
use tandem::script::{ScriptRunner, parse_script};

#[test]
fn test_split_view_shares_document_and_managers() {
    let lead = Editor::new();
    lead.set_text("fn main() {}\n");
    lead.panels()
        .unwrap()
        .install(Panel::new("line-numbers", PanelPosition::Left));
    lead.features().unwrap().install(Feature::new("auto-indent"));

    let split = Editor::new();
    split.follow(&lead, false);
    let outcomes = split.set_shared_reference(&lead);

    assert!(outcomes.iter().all(|(_, result)| result.is_ok()));
    assert!(split.following(&lead));
    assert_eq!(split.text(), "fn main() {}\n");

    // edits on the lead are visible through the split without copying
    lead.set_text("fn main() { run() }\n");
    assert_eq!(split.text(), "fn main() { run() }\n");

    // manager slots mirror the lead's managers by identity
    let split_panels = split.panels().unwrap();
    assert!(Rc::ptr_eq(
        &split_panels.shared_reference().unwrap(),
        &lead.panels().unwrap()
    ));
    let split_features = split.features().unwrap();
    assert!(Rc::ptr_eq(
        &split_features.shared_reference().unwrap(),
        &lead.features().unwrap()
    ));
}

#[test]
fn test_debounced_reparse_after_edit_burst() {
    let editor = Editor::new();
    let delay = Duration::from_millis(500);
    let mut runner = DelayJobRunner::new(delay);
    let parsed = Rc::new(std::cell::RefCell::new(Vec::new()));

    let start = Instant::now();
    let mut now = start;
    for i in 0..10 {
        editor.set_text(&format!("draft {i}"));
        let editor = editor.clone();
        let parsed = Rc::clone(&parsed);
        runner.request(
            Job::new("reparse", move || {
                parsed.borrow_mut().push(editor.text());
                Ok(())
            }),
            now,
        );
        now += Duration::from_millis(50);
    }

    assert!(runner.run_due(now + delay).unwrap());
    assert_eq!(
        *parsed.borrow(),
        vec!["draft 9".to_string()],
        "only the state of the last request is ever parsed"
    );
}

/// A panels-slot component from "somewhere else": right key, wrong type.
struct ForeignPanels;

impl Shareable for ForeignPanels {
    fn key(&self) -> ShareKey {
        ShareKey::Panels
    }

    fn type_label(&self) -> &'static str {
        "ForeignPanels"
    }

    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn adopt_shared(&self, source: &Rc<dyn Shareable>) -> Result<(), ShareError> {
        if Rc::clone(source).as_any_rc().downcast::<Self>().is_ok() {
            Ok(())
        } else {
            Err(ShareError::Incompatible {
                key: self.key(),
                expected: "ForeignPanels",
                found: source.type_label(),
            })
        }
    }
}

#[test]
fn test_partial_propagation_survives_foreign_component() {
    let lead = Editor::new();
    let split = Editor::new();
    split
        .replace_shareable(ShareKey::Panels, Rc::new(ForeignPanels) as Rc<dyn Shareable>)
        .unwrap();

    let outcomes = split.set_shared_reference(&lead);

    let (panels_key, panels_outcome) = &outcomes[0];
    assert_eq!(*panels_key, ShareKey::Panels);
    assert!(panels_outcome.is_err());

    let (features_key, features_outcome) = &outcomes[1];
    assert_eq!(*features_key, ShareKey::Features);
    assert!(
        features_outcome.is_ok(),
        "a rejected slot must not block the remaining slots"
    );

    assert_eq!(split.shared_reference(), Some(lead));
}

#[test]
fn test_script_replay_round_trip() {
    let json = r#"[
        {"step": "create", "editor": "lead"},
        {"step": "create", "editor": "split"},
        {"step": "follow", "editor": "split", "other": "lead"},
        {"step": "mirror", "editor": "split", "other": "lead"},
        {"step": "set_text", "editor": "lead", "text": "shared"},
        {"step": "request", "editor": "lead", "job": "reparse"},
        {"step": "advance", "ms": 250},
        {"step": "request", "editor": "lead", "job": "reparse"},
        {"step": "advance", "ms": 600}
    ]"#;

    let steps = parse_script(json).unwrap();
    let mut runner = ScriptRunner::new(Duration::from_millis(500));
    runner.run(&steps).unwrap();

    let trace = runner.trace();
    let job_lines: Vec<_> = trace
        .iter()
        .filter(|line| line.starts_with("job "))
        .collect();
    assert_eq!(
        job_lines,
        vec!["job reparse(lead) ran rev=1"],
        "the burst coalesced into one execution"
    );
    assert!(
        trace
            .contains(&"mirror split -> lead [panels: ok, features: ok]".to_string())
    );
}
