/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Handle of a namespace scope frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ScopeId(usize);

impl ScopeId {
    pub(crate) const ROOT: ScopeId = ScopeId(0);
}

struct Frame {
    parent: Option<ScopeId>,
    bindings: Vec<(String, String)>,
}

/// Prefix to URI bindings of the currently open tags.
///
/// Frames live in a vector and link to their parent by index. A tag which
/// declares no namespaces shares the frame of its parent, so the number of
/// frames is bounded by the number of open tags with declarations. Since a
/// frame is only ever created for the innermost tag, frames are released in
/// stack order when their tags close.
pub(crate) struct Scopes {
    frames: Vec<Frame>,
}

impl Scopes {
    pub(crate) fn new() -> Scopes {
        Scopes {
            frames: vec![Frame {
                parent: None,
                bindings: vec![
                    ("xml".to_string(), XML_NAMESPACE.to_string()),
                    ("xmlns".to_string(), XMLNS_NAMESPACE.to_string()),
                ],
            }],
        }
    }

    pub(crate) fn reset(&mut self) {
        self.frames.truncate(1);
    }

    /// Drops every frame layered above `scope`.
    pub(crate) fn release_above(&mut self, scope: ScopeId) {
        self.frames.truncate(scope.0 + 1);
    }

    /// Creates a new empty frame on top of `parent`.
    pub(crate) fn push(&mut self, parent: ScopeId) -> ScopeId {
        self.release_above(parent);
        self.frames.push(Frame {
            parent: Some(parent),
            bindings: Vec::new(),
        });
        ScopeId(self.frames.len() - 1)
    }

    /// Binds `prefix` in the given frame, replacing an earlier binding of the same frame.
    pub(crate) fn bind(&mut self, scope: ScopeId, prefix: &str, uri: &str) {
        let bindings = &mut self.frames[scope.0].bindings;
        match bindings.iter_mut().find(|(p, _)| p == prefix) {
            Some((_, u)) => {
                u.clear();
                u.push_str(uri);
            }
            None => bindings.push((prefix.to_string(), uri.to_string())),
        }
    }

    /// Resolves `prefix` by walking the frame chain upwards.
    pub(crate) fn lookup(&self, scope: ScopeId, prefix: &str) -> Option<&str> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = &self.frames[id.0];
            if let Some((_, uri)) = frame.bindings.iter().find(|(p, _)| p == prefix) {
                return Some(uri);
            }
            current = frame.parent;
        }
        None
    }

    /// Bindings declared by the frame itself, in declaration order.
    pub(crate) fn own_bindings(&self, scope: ScopeId) -> &[(String, String)] {
        &self.frames[scope.0].bindings
    }
}

/// Splits a qualified name into prefix and local part.
///
/// A bare `xmlns` attribute declares the default namespace and is reported
/// with the `xmlns` prefix and an empty local part.
pub(crate) fn split_qname(name: &str, is_attribute: bool) -> (&str, &str) {
    if is_attribute && name == "xmlns" {
        return ("xmlns", "");
    }
    match name.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", name),
    }
}
