//! Reference resolution: discover, order, then inline or promote each reference.
//!
//! Resolution runs to completion on the calling thread. The first failure
//! aborts it and the document may be left partially rewritten.

use std::collections::HashSet;

use crate::config::ResolveConfig;
use crate::discovery::{self, DiscoveredReference};
use crate::document::{Document, Session};
use crate::error::Error;
use crate::location::{self, Location};
use crate::pointer;
use crate::tree::Tree;

/// Resolve every reference in `document` with a fresh session.
///
/// # Errors
///
/// Returns `Error::ReferenceResolution` naming the first reference that
/// could not be resolved, or `Error::UnsupportedNodeKind` from discovery.
pub fn resolve(document: &mut Document, config: &ResolveConfig) -> Result<(), Error> {
    let mut session = Session::new();
    return resolve_in(document, config, &mut session);
}

/// Resolve every reference in `document`, loading referenced files through
/// `session` so each physical file is parsed once.
///
/// Remote references are handled before local ones: a local reference may
/// alias a slot a remote reference is about to populate, and must copy the
/// populated content.
///
/// # Errors
///
/// Returns `Error::ReferenceResolution` naming the first reference that
/// could not be resolved, or `Error::UnsupportedNodeKind` from discovery.
pub fn resolve_in(document: &mut Document, config: &ResolveConfig, session: &mut Session) -> Result<(), Error> {
    let mut references = discovery::discover(document.tree())?;
    references.sort_by_key(|r| return pointer::remote_first_rank(&r.path));
    tracing::debug!(
        document = %document.origin().display(),
        count = references.len(),
        "discovered references"
    );

    for reference in &references {
        resolve_reference(document, config, session, reference)
            .map_err(|e| return e.while_resolving(&reference.path, document.origin().to_path_buf()))?;
    }

    return Ok(());
}

/// Apply the inline/promotion policy to one reference.
fn resolve_reference(
    document: &mut Document,
    config: &ResolveConfig,
    session: &mut Session,
    reference: &DiscoveredReference,
) -> Result<(), Error> {
    if !pointer::is_local(&reference.path) {
        return promote_remote(document, config, session, reference);
    }
    if !config.inline_local {
        return Ok(());
    }
    return inline_local(document.tree_mut(), config, reference);
}

/// Point the reference slot at the node its local target chain ends in,
/// then clear every target on the chain unless they are kept.
fn inline_local(tree: &mut Tree, config: &ResolveConfig, reference: &DiscoveredReference) -> Result<(), Error> {
    // An earlier reference may have cleared or replaced this one's slot.
    if reference.location.get(tree).ok().flatten() != Some(reference.node) {
        tracing::trace!(reference = %reference.path, "reference no longer in place");
        return Ok(());
    }

    let targets = follow_local(tree, &reference.path)?;
    let Some(last) = targets.last() else {
        return Err(Error::unresolvable(&reference.path, "reference has no target"));
    };
    let value = last.get(tree)?;
    reference.location.set(tree, value)?;

    if config.clears_local_targets() {
        for target in &targets {
            target.clear(tree)?;
        }
    }
    tracing::debug!(reference = %reference.path, hops = targets.len(), "inlined local reference");
    return Ok(());
}

/// Locations visited from `path` through targets that are themselves local
/// references, ending at the first target that is not.
fn follow_local(tree: &Tree, path: &str) -> Result<Vec<Location>, Error> {
    let mut targets = Vec::new();
    let mut seen = HashSet::new();
    let mut current = path.to_string();
    loop {
        if !seen.insert(current.clone()) {
            return Err(Error::unresolvable(current, "local references form a cycle"));
        }
        let target = location::walk(tree, &segments_of(&current)?)?;
        let next = target
            .get(tree)?
            .and_then(|id| return tree.reference_of(id))
            .filter(|next| return pointer::is_local(next))
            .map(str::to_string);
        targets.push(target);
        let Some(next) = next else {
            return Ok(targets);
        };
        current = next;
    }
}

/// Copy the remote target into this document's shared area. The reference
/// becomes a local pointer to the copy, or the copy itself when local
/// references are inlined, so no pointer is left that a parent document
/// could not follow.
fn promote_remote(
    document: &mut Document,
    config: &ResolveConfig,
    session: &mut Session,
    reference: &DiscoveredReference,
) -> Result<(), Error> {
    let segments = segments_of(&reference.path)?;
    let source = session.document_for(document.source_dir(), &reference.path)?;
    let source_tree = source.tree();
    let value = location::walk(source_tree, &segments)?.get(source_tree)?;

    let tree = document.tree_mut();
    let copy = value.map(|id| return tree.import(source_tree, id)).transpose()?;
    location::walk_or_create(tree, &segments)?.set(tree, copy)?;

    if config.inline_local {
        reference.location.set(tree, copy)?;
        tracing::debug!(reference = %reference.path, "inlined remote reference");
    } else {
        let promoted = pointer::promote(&reference.path);
        tree.set_reference(reference.node, promoted)?;
        tracing::debug!(reference = %reference.path, promoted, "promoted remote reference");
    }
    return Ok(());
}

/// Pointer segments of a reference that must address something below the root.
fn segments_of(path: &str) -> Result<Vec<&str>, Error> {
    let segments = pointer::pointer_segments(path);
    if segments.is_empty() {
        return Err(Error::unresolvable(path, "reference has no in-document pointer"));
    }
    return Ok(segments);
}
