//! Member path construction.
//!
//! Paths use `.name` for members and `[index]` for elements, e.g.
//! `ArrayOfB[1].Property1`. The comparison root has the empty path.

/// `parent.member`, or `member` at the root
pub fn member_path(parent: &str, member: &str) -> String {
    if parent.is_empty() {
        member.to_string()
    } else {
        format!("{}.{}", parent, member)
    }
}

/// `parent[index]`, where `index` is the element's ordinal position
pub fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

/// `parent[key]` for keyed entries
pub fn key_path(parent: &str, key: &str) -> String {
    format!("{}[{}]", parent, key)
}

/// Pseudo-member reporting an array length mismatch
pub fn length_path(parent: &str) -> String {
    member_path(parent, "Length")
}

/// Pseudo-member reporting a collection count mismatch
pub fn count_path(parent: &str) -> String {
    member_path(parent, "Count")
}

/// Strips module paths from a `std::any::type_name` string.
///
/// `alloc::vec::Vec<my_crate::B>` becomes `Vec<B>`.
pub fn short_type_name(name: &str) -> String {
    let mut short = String::with_capacity(name.len());
    let mut segment = String::new();

    for ch in name.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            flush_segment(&mut segment, &mut short);
            short.push(ch);
        }
    }
    flush_segment(&mut segment, &mut short);
    short
}

fn flush_segment(segment: &mut String, out: &mut String) {
    if let Some(last) = segment.rsplit("::").next() {
        out.push_str(last);
    }
    segment.clear();
}
