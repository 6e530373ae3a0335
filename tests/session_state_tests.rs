use smart_jotter_lib::core::errors::AppError;
use smart_jotter_lib::core::types::{InputKind, PipelineStage, Stroke, StrokePoint};
use smart_jotter_lib::jotter::session::{transition_allowed, InputDraft, JotterSession};

const ALL_STAGES: [PipelineStage; 6] = [
    PipelineStage::AwaitingInput,
    PipelineStage::Recognizing,
    PipelineStage::Extracting,
    PipelineStage::Reviewing,
    PipelineStage::Failed,
    PipelineStage::Done,
];

#[test]
fn reviewing_is_only_reachable_from_extracting() {
    for stage in ALL_STAGES {
        let expected = stage == PipelineStage::Extracting;
        assert_eq!(
            transition_allowed(stage, PipelineStage::Reviewing),
            expected,
            "from {stage:?}"
        );
    }
}

#[test]
fn no_stage_is_skipped_on_the_forward_path() {
    assert!(!transition_allowed(PipelineStage::AwaitingInput, PipelineStage::Reviewing));
    assert!(!transition_allowed(PipelineStage::AwaitingInput, PipelineStage::Done));
    assert!(!transition_allowed(PipelineStage::Recognizing, PipelineStage::Reviewing));
    assert!(!transition_allowed(PipelineStage::Recognizing, PipelineStage::Done));
    assert!(!transition_allowed(PipelineStage::Extracting, PipelineStage::Done));
}

#[test]
fn only_two_backward_transitions_exist() {
    let mut backward = vec![];
    for from in ALL_STAGES {
        if transition_allowed(from, PipelineStage::AwaitingInput) {
            backward.push(from);
        }
    }
    assert_eq!(backward, vec![PipelineStage::Reviewing, PipelineStage::Failed]);

    // Nothing transitions back into the middle of the pipeline.
    for from in ALL_STAGES {
        assert!(!transition_allowed(from, PipelineStage::Recognizing) || from == PipelineStage::AwaitingInput);
        assert!(
            !transition_allowed(from, PipelineStage::Extracting)
                || matches!(from, PipelineStage::AwaitingInput | PipelineStage::Recognizing)
        );
    }
}

#[test]
fn done_and_failed_states_are_terminal_except_start_over() {
    for to in ALL_STAGES {
        assert!(!transition_allowed(PipelineStage::Done, to), "done -> {to:?}");
        let expected = to == PipelineStage::AwaitingInput;
        assert_eq!(transition_allowed(PipelineStage::Failed, to), expected, "failed -> {to:?}");
    }
}

#[test]
fn illegal_advance_is_rejected_and_leaves_the_stage_alone() {
    let mut session = JotterSession::new();
    let result = session.advance(PipelineStage::Reviewing);
    assert!(matches!(result, Err(AppError::Internal(_))));
    assert_eq!(session.stage, PipelineStage::AwaitingInput);
}

#[test]
fn failing_a_run_records_the_error_taxonomy_code() {
    let mut session = JotterSession::new();
    session.advance(PipelineStage::Recognizing).expect("submit");
    let error = AppError::RecognitionFailed("nothing legible".to_string());
    session.fail(&error).expect("fail transition");

    assert_eq!(session.stage, PipelineStage::Failed);
    let recorded = session.last_error.expect("error recorded");
    assert_eq!(recorded.code, "RECOGNITION_FAILURE");
    assert!(session.run_id.is_none());
}

#[test]
fn switching_input_kind_discards_the_other_kinds_data() {
    let mut draft = InputDraft::default();
    draft.text = "Ford Focus won't start".to_string();

    draft.set_kind(InputKind::Drawing);
    assert!(draft.text.is_empty());

    draft.drawing.strokes.push(Stroke {
        points: vec![StrokePoint { x: 1.0, y: 2.0, t: 0 }],
    });
    draft.set_kind(InputKind::Text);
    assert_eq!(draft.stroke_count(), 0);
    assert!(!draft.has_raster());
}

#[test]
fn switching_to_the_same_kind_keeps_the_data() {
    let mut draft = InputDraft::default();
    draft.text = "keep me".to_string();
    draft.set_kind(InputKind::Text);
    assert_eq!(draft.text, "keep me");
}

#[test]
fn undo_and_clear_are_no_ops_when_empty() {
    let mut draft = InputDraft::default();
    draft.set_kind(InputKind::Drawing);
    assert_eq!(draft.undo_last_stroke(), 0);
    assert!(!draft.clear_drawing());

    draft.drawing.strokes.push(Stroke {
        points: vec![StrokePoint { x: 1.0, y: 2.0, t: 0 }],
    });
    draft.drawing.strokes.push(Stroke {
        points: vec![StrokePoint { x: 3.0, y: 4.0, t: 16 }],
    });
    assert_eq!(draft.undo_last_stroke(), 1);
    assert!(draft.clear_drawing());
    assert_eq!(draft.stroke_count(), 0);
}

#[test]
fn reset_bumps_the_generation_so_late_results_are_stale() {
    let mut session = JotterSession::new();
    let before = session.generation;
    session.advance(PipelineStage::Recognizing).expect("submit");
    session
        .fail(&AppError::RecognitionFailed("nothing legible".to_string()))
        .expect("fail");
    session.reset_to_input(true);

    assert_eq!(session.stage, PipelineStage::AwaitingInput);
    assert!(session.generation > before);
    assert!(session.record.is_none());
    assert!(session.last_error.is_none());
}
