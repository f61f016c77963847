use super::*;
use crate::blocks::ContentBlock;
use crate::registry::{TagRegistry, ToolSchema};

/// Parses the whole input in one call, then finalizes.
fn parse_one_shot(input: &str, registry: TagRegistry) -> Vec<ContentBlock> {
    let mut parser = AssistantMessageParser::new(registry);
    parser.process_chunk(input);
    parser.finalize_blocks();
    parser.blocks().to_vec()
}

/// Feeds the input one character at a time, then finalizes.
fn parse_char_by_char(input: &str, registry: TagRegistry) -> Vec<ContentBlock> {
    let mut parser = AssistantMessageParser::new(registry);
    let mut buf = [0u8; 4];
    for c in input.chars() {
        parser.process_chunk(c.encode_utf8(&mut buf));
    }
    parser.finalize_blocks();
    parser.blocks().to_vec()
}

fn registry_with(names: &[&str]) -> TagRegistry {
    TagRegistry::with_custom_tools(
        names
            .iter()
            .map(|n| ToolSchema::custom(*n, vec![], None)),
    )
}

fn tool<'a>(blocks: &'a [ContentBlock], idx: usize) -> &'a crate::blocks::ToolUseBlock {
    blocks[idx]
        .as_tool_use()
        .unwrap_or_else(|| panic!("block {idx} is not a tool use: {:?}", blocks[idx]))
}

#[test]
fn test_plain_text_only() {
    let blocks = parse_one_shot("just some prose, no tools here.", TagRegistry::new());
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].as_text(), Some("just some prose, no tools here."));
    assert!(!blocks[0].is_partial());
}

#[test]
fn test_empty_stream() {
    let mut parser = AssistantMessageParser::with_builtins();
    parser.finalize_blocks();
    assert!(parser.blocks().is_empty());
}

#[test]
fn test_builtin_tool_recognition() {
    let blocks = parse_one_shot(
        "<read_file>\n<path>test.ts</path>\n</read_file>",
        TagRegistry::new(),
    );
    assert_eq!(blocks.len(), 1);
    let t = tool(&blocks, 0);
    assert_eq!(t.name, "read_file");
    assert!(!t.partial);
    assert_eq!(t.params.get("path"), Some("test.ts"));
    assert_eq!(t.raw_body, None);
}

#[test]
fn test_custom_tool_recognition_vs_fallback() {
    let input = "<add_numbers>\n<num1>5</num1>\n<num22>10</num22>\n</add_numbers>";

    // Registered: one tool-use block, body kept as a raw payload.
    let blocks = parse_one_shot(input, registry_with(&["add_numbers"]));
    assert_eq!(blocks.len(), 1);
    let t = tool(&blocks, 0);
    assert_eq!(t.name, "add_numbers");
    assert!(!t.partial);
    assert_eq!(
        t.raw_body.as_deref(),
        Some("\n<num1>5</num1>\n<num22>10</num22>\n")
    );

    // Unregistered: zero tool-use blocks, literal text instead.
    let blocks = parse_one_shot(input, TagRegistry::new());
    assert!(blocks.iter().all(|b| b.as_tool_use().is_none()));
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].as_text(), Some(input));
}

#[test]
fn test_mixed_builtin_and_custom() {
    let input = "Let me check.\n\
        <read_file>\n<path>a.rs</path>\n</read_file>\n\
        Now the numbers:\n\
        <add_numbers>\n<num1>5</num1>\n</add_numbers>\n\
        Done.";
    let blocks = parse_one_shot(input, registry_with(&["add_numbers"]));

    assert_eq!(blocks.len(), 5);
    assert_eq!(blocks[0].as_text(), Some("Let me check.\n"));
    assert_eq!(tool(&blocks, 1).name, "read_file");
    assert_eq!(blocks[2].as_text(), Some("\nNow the numbers:\n"));
    assert_eq!(tool(&blocks, 3).name, "add_numbers");
    assert_eq!(blocks[4].as_text(), Some("\nDone."));
    assert!(blocks.iter().all(|b| !b.is_partial()));
}

#[test]
fn test_multiple_params_in_stream_order() {
    let blocks = parse_one_shot(
        "<search_files>\n<regex>fn main</regex>\n<path>src</path>\n</search_files>",
        TagRegistry::new(),
    );
    let t = tool(&blocks, 0);
    let order: Vec<&str> = t.params.iter().map(|(n, _)| n).collect();
    assert_eq!(order, ["regex", "path"]);
    assert_eq!(t.params.get("regex"), Some("fn main"));
    assert_eq!(t.params.get("path"), Some("src"));
}

#[test]
fn test_repeated_param_overwrites() {
    let blocks = parse_one_shot(
        "<read_file>\n<path>old.rs</path>\n<path>new.rs</path>\n</read_file>",
        TagRegistry::new(),
    );
    let t = tool(&blocks, 0);
    assert_eq!(t.params.len(), 1);
    assert_eq!(t.params.get("path"), Some("new.rs"));
}

#[test]
fn test_raw_param_immune_to_nested_tags() {
    let input = "<write_to_file>\n<path>index.html</path>\n<content>\n\
        <div class=\"x\">1 < 2 && 3 > 2</div>\n<content>not a boundary</content2>\n\
        </content>\n</write_to_file>";
    let blocks = parse_one_shot(input, TagRegistry::new());
    assert_eq!(blocks.len(), 1);
    let t = tool(&blocks, 0);
    assert!(!t.partial);
    assert_eq!(t.params.get("path"), Some("index.html"));
    assert_eq!(
        t.params.get("content"),
        Some(
            "\n<div class=\"x\">1 < 2 && 3 > 2</div>\n<content>not a boundary</content2>\n"
        )
    );
}

#[test]
fn test_raw_param_keeps_text_before_last_closer() {
    // The value itself contains the parameter's closing tag; only the last
    // occurrence (the real one) is stripped.
    let input = "<replace_in_file>\n<path>a.md</path>\n<diff>\n\
        <<<<<<< SEARCH\nuse the </diff> tag\n=======\nreworded\n>>>>>>> REPLACE\n\
        </diff>\n</replace_in_file>";
    let blocks = parse_one_shot(input, TagRegistry::new());
    let t = tool(&blocks, 0);
    assert_eq!(
        t.params.get("diff"),
        Some(
            "\n<<<<<<< SEARCH\nuse the </diff> tag\n=======\nreworded\n>>>>>>> REPLACE\n"
        )
    );
}

#[test]
fn test_unknown_tags_render_as_text() {
    let input = "a < b, <not a tag>, </path>, <unknown_tool>x</unknown_tool>, done";
    let blocks = parse_one_shot(input, TagRegistry::new());
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].as_text(), Some(input));
}

#[test]
fn test_filler_inside_tool_body_is_ignored() {
    let input = "<read_file>\nplease read\n<hint>fast</hint>\n<path>a.rs</path>\n</read_file>";
    let blocks = parse_one_shot(input, TagRegistry::new());
    let t = tool(&blocks, 0);
    assert_eq!(t.params.len(), 1);
    assert_eq!(t.params.get("path"), Some("a.rs"));
}

#[test]
fn test_partial_monotonicity_while_streaming() {
    let input = "prose <write_to_file>\n<path>x</path>\n<content>line1\nline2</content>\n\
        </write_to_file> tail";
    let mut parser = AssistantMessageParser::with_builtins();
    let mut buf = [0u8; 4];
    let mut seen = 0;
    for c in input.chars() {
        let blocks = parser.process_chunk(c.encode_utf8(&mut buf));
        // Append-only: earlier blocks never disappear.
        assert!(blocks.len() >= seen);
        seen = blocks.len();
        // At most one partial block, and it is always the last.
        let partials = blocks.iter().filter(|b| b.is_partial()).count();
        assert!(partials <= 1);
        if partials == 1 {
            assert!(blocks.last().map(|b| b.is_partial()).unwrap_or(false));
        }
    }
    parser.finalize_blocks();
    assert!(parser.blocks().iter().all(|b| !b.is_partial()));
}

#[test]
fn test_chunking_invariance_exhaustive_split_points() {
    let inputs = [
        "hello world",
        "a < b and c > d",
        "<read_file>\n<path>café/naïve.ts</path>\n</read_file>",
        "pre <read_file>\n<path>a.rs</path>\n</read_file> post",
        "<write_to_file>\n<path>x</path>\n<content>\n<a href=\"y\">z</a>\n</content>\n</write_to_file>",
        "<add_numbers>\n<num1>5</num1>\n</add_numbers>",
        "truncated <read_file>\n<path>par",
    ];
    for input in inputs {
        let expected = parse_one_shot(input, registry_with(&["add_numbers"]));

        // Every two-chunk split.
        for (split, _) in input.char_indices().skip(1) {
            let mut parser = AssistantMessageParser::new(registry_with(&["add_numbers"]));
            parser.process_chunk(&input[..split]);
            parser.process_chunk(&input[split..]);
            parser.finalize_blocks();
            assert_eq!(
                parser.blocks(),
                expected.as_slice(),
                "split at byte {split} of {input:?}"
            );
        }

        // One character per chunk.
        let tiny = parse_char_by_char(input, registry_with(&["add_numbers"]));
        assert_eq!(tiny, expected, "char-by-char of {input:?}");
    }
}

#[test]
fn test_empty_chunk_is_a_no_op() {
    let mut parser = AssistantMessageParser::with_builtins();
    parser.process_chunk("some text <read_file>\n<path>a");
    let before = parser.blocks().to_vec();
    let after = parser.process_chunk("").to_vec();
    assert_eq!(before, after);
}

#[test]
fn test_finalize_is_idempotent() {
    let mut parser = AssistantMessageParser::with_builtins();
    parser.process_chunk("text then <read_file>\n<path>half");
    parser.finalize_blocks();
    let first = parser.blocks().to_vec();
    parser.finalize_blocks();
    assert_eq!(parser.blocks(), first.as_slice());
}

#[test]
fn test_truncated_tag_in_text_becomes_literal() {
    let mut parser = AssistantMessageParser::with_builtins();
    parser.process_chunk("hello <read_fi");
    // The undecided suffix is withheld from the partial block...
    assert_eq!(parser.blocks()[0].as_text(), Some("hello "));
    parser.finalize_blocks();
    // ...and committed as literal text once the stream ends.
    assert_eq!(parser.blocks().len(), 1);
    assert_eq!(parser.blocks()[0].as_text(), Some("hello <read_fi"));
    assert!(!parser.blocks()[0].is_partial());
}

#[test]
fn test_truncated_param_closes_with_accumulated_value() {
    let mut parser = AssistantMessageParser::with_builtins();
    parser.process_chunk("<read_file>\n<path>src/ma");
    assert!(parser.blocks()[0].is_partial());
    parser.finalize_blocks();
    let blocks = parser.blocks();
    let t = tool(blocks, 0);
    assert!(!t.partial);
    assert_eq!(t.params.get("path"), Some("src/ma"));
}

#[test]
fn test_truncated_raw_param_strips_arrived_closer() {
    let mut parser = AssistantMessageParser::with_builtins();
    parser.process_chunk("<write_to_file>\n<path>x</path>\n<content>abc</content>");
    parser.finalize_blocks();
    let blocks = parser.blocks();
    let t = tool(blocks, 0);
    assert!(!t.partial);
    assert_eq!(t.params.get("content"), Some("abc"));
}

#[test]
fn test_tool_closer_split_across_chunks() {
    let mut parser = AssistantMessageParser::with_builtins();
    parser.process_chunk("<read_file>\n<path>a.rs</path>\n</read_");
    assert!(parser.blocks()[0].is_partial());
    let blocks = parser.process_chunk("file>ok");
    assert_eq!(blocks.len(), 2);
    assert!(!blocks[0].is_partial());
    assert_eq!(blocks[1].as_text(), Some("ok"));
}

#[test]
fn test_back_to_back_tools_without_text_between() {
    let input = "<read_file>\n<path>a</path>\n</read_file><read_file>\n<path>b</path>\n</read_file>";
    let blocks = parse_one_shot(input, TagRegistry::new());
    assert_eq!(blocks.len(), 2);
    assert_eq!(tool(&blocks, 0).params.get("path"), Some("a"));
    assert_eq!(tool(&blocks, 1).params.get("path"), Some("b"));
}

#[test]
fn test_reset_starts_a_fresh_session() {
    let mut parser = AssistantMessageParser::with_builtins();
    parser.process_chunk("<read_file>\n<path>a</path>\n</read_file>");
    parser.finalize_blocks();
    assert_eq!(parser.blocks().len(), 1);

    parser.reset();
    assert!(parser.blocks().is_empty());
    parser.process_chunk("fresh text");
    parser.finalize_blocks();
    assert_eq!(parser.blocks()[0].as_text(), Some("fresh text"));
}

#[test]
fn test_partial_text_grows_in_place() {
    let mut parser = AssistantMessageParser::with_builtins();
    parser.process_chunk("grad");
    assert_eq!(parser.blocks()[0].as_text(), Some("grad"));
    assert!(parser.blocks()[0].is_partial());
    parser.process_chunk("ually");
    assert_eq!(parser.blocks().len(), 1);
    assert_eq!(parser.blocks()[0].as_text(), Some("gradually"));
}

#[test]
fn test_custom_tool_with_declared_schema() {
    let registry = TagRegistry::with_custom_tools([ToolSchema::custom(
        "render_chart",
        vec!["title".into(), "spec".into()],
        Some("spec".into()),
    )]);
    let input = "<render_chart>\n<title>Sales</title>\n<spec>{\"x\": \"<month>\"}</spec>\n</render_chart>";
    let blocks = parse_one_shot(input, registry);
    let t = tool(&blocks, 0);
    assert_eq!(t.params.get("title"), Some("Sales"));
    assert_eq!(t.params.get("spec"), Some("{\"x\": \"<month>\"}"));
    assert_eq!(t.raw_body, None);
}
