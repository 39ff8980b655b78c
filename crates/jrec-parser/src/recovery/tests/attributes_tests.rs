use super::*;

fn annotation(name: &str, start: u32, end: u32) -> Annotation {
    Annotation {
        type_name: name.to_string(),
        span: Span::new(start, end),
    }
}

#[test]
fn flush_moves_everything_and_clears() {
    let mut pending = PendingAttributes::new();
    pending.add_annotation(annotation("Deprecated", 2, 13));
    pending.add_modifier(ModifierFlags::PUBLIC, 14);
    pending.add_modifier(ModifierFlags::STATIC, 21);

    let mut modifiers = ModifierFlags::FINAL;
    let mut annotations = vec![annotation("Override", 28, 37)];
    let mut span = Span::open(38);
    pending.flush_into(&mut modifiers, &mut annotations, &mut span);

    assert!(pending.is_empty());
    assert!(pending.annotations().is_empty());
    assert_eq!(
        modifiers,
        ModifierFlags::PUBLIC | ModifierFlags::STATIC | ModifierFlags::FINAL
    );
    assert_eq!(annotations[0].type_name, "Deprecated");
    assert_eq!(annotations[1].type_name, "Override");
    assert_eq!(span.start, 2);
    assert!(!span.is_end_known());
}

#[test]
fn flushing_empty_buffer_is_a_no_op() {
    let mut pending = PendingAttributes::new();
    let mut modifiers = ModifierFlags::empty();
    let mut annotations = Vec::new();
    let mut span = Span::new(5, 9);
    pending.flush_into(&mut modifiers, &mut annotations, &mut span);
    assert!(modifiers.is_empty());
    assert_eq!(span, Span::new(5, 9));
}

#[test]
fn merge_keeps_earliest_start() {
    let mut parent = PendingAttributes::new();
    parent.add_modifier(ModifierFlags::PRIVATE, 40);
    let mut child = PendingAttributes::new();
    child.add_modifier(ModifierFlags::FINAL, 20);

    parent.merge_from(&mut child);
    assert!(child.is_empty());
    assert_eq!(parent.start(), Some(20));
    assert_eq!(
        parent.modifiers(),
        ModifierFlags::PRIVATE | ModifierFlags::FINAL
    );
}

#[test]
fn span_covers_annotations() {
    let mut pending = PendingAttributes::new();
    pending.add_modifier(ModifierFlags::PUBLIC, 3);
    pending.add_annotation(annotation("A", 10, 12));
    assert_eq!(pending.span(), Some(Span::new(3, 12)));
}
