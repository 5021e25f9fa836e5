use hashlink::LinkedHashMap;
use snafu::prelude::*;
use tracing::debug;

use super::{Node, NodeId, NodeKind};

/// Name of the root directory, also its prompt rendering.
pub const ROOT_NAME: &str = "/";

const PARENT_DIR: &str = "..";

/// The in-memory filesystem: node storage, the current-directory cursor,
/// and the operations the shell exposes.
///
/// Nodes live in a single insertion-ordered map keyed by `NodeId`. The map
/// is both the arena and the registry: membership is liveness, and iteration
/// order makes "first match" lookups return the oldest-created node.
#[derive(Debug)]
pub struct FileTree {
    nodes: LinkedHashMap<NodeId, Node>,
    next_id: u64,
    root: NodeId,
    cursor: NodeId,
    cwd_path: String,
}

impl FileTree {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = LinkedHashMap::new();
        nodes.insert(root, Node::new(ROOT_NAME, NodeKind::Directory, None));
        FileTree {
            nodes,
            next_id: 1,
            root,
            cursor: root,
            cwd_path: String::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Path shown in the prompt: the cached path of the cursor, or the
    /// root's bare name when the cursor sits at the root.
    pub fn display_path(&self) -> &str {
        if self.cursor == self.root {
            ROOT_NAME
        } else {
            &self.cwd_path
        }
    }

    /// Canonical absolute path of a live node: `/` plus the name of each
    /// non-root ancestor, top-down. The root itself yields the empty string,
    /// so no non-empty path argument can ever name it.
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        let mut segments = Vec::new();
        let mut node = self.nodes.get(&id)?;
        while let Some(parent) = node.parent {
            segments.push(node.name.as_str());
            node = self.nodes.get(&parent)?;
        }
        let mut path = String::new();
        for segment in segments.iter().rev() {
            path.push('/');
            path.push_str(segment);
        }
        Some(path)
    }

    /// First non-root node (in creation order) whose canonical path equals
    /// `path`. The comparison is literal; neither side is normalized.
    pub fn find_node(&self, path: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_some())
            .map(|(id, _)| *id)
            .find(|id| self.path_of(*id).as_deref() == Some(path))
    }

    /// First node (in creation order, root included) whose bare name equals
    /// `name`.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| *id)
    }

    /// First direct child of `dir` matching both name and kind. A directory
    /// and a file may share a name under the same parent.
    pub fn find_child(&self, dir: NodeId, name: &str, kind: NodeKind) -> Option<NodeId> {
        self.nodes.get(&dir)?.children.iter().copied().find(|child| {
            self.nodes
                .get(child)
                .is_some_and(|node| node.name == name && node.kind == kind)
        })
    }

    /// Create an empty directory under the cursor.
    pub fn mkdir(&mut self, name: &str) -> Result<NodeId, FilesystemError> {
        ensure!(
            self.find_child(self.cursor, name, NodeKind::Directory).is_none(),
            AlreadyExistsSnafu { name }
        );
        let id = self.insert_child(self.cursor, name, NodeKind::Directory);
        debug!("Created directory '{}' in '{}'", name, self.display_path());
        Ok(id)
    }

    /// Create an empty file under the cursor.
    pub fn touch(&mut self, name: &str) -> Result<NodeId, FilesystemError> {
        ensure!(
            self.find_child(self.cursor, name, NodeKind::File).is_none(),
            AlreadyExistsSnafu { name }
        );
        let id = self.insert_child(self.cursor, name, NodeKind::File);
        debug!("Created file '{}' in '{}'", name, self.display_path());
        Ok(id)
    }

    /// Move the cursor. `..` as the whole argument climbs to the parent and
    /// is a no-op at the root; anything else is split on `/` and walked one
    /// directory segment at a time. Segments already walked are kept when a
    /// later one fails to resolve.
    pub fn cd(&mut self, destination: &str) -> Result<(), FilesystemError> {
        if destination == PARENT_DIR {
            if let Some(parent) = self.nodes.get(&self.cursor).and_then(|node| node.parent) {
                self.cursor = parent;
                self.refresh_cwd_path();
            }
            return Ok(());
        }

        for segment in destination.split('/') {
            let next = self
                .find_child(self.cursor, segment, NodeKind::Directory)
                .context(PathNotFoundSnafu)?;
            self.cursor = next;
            self.cwd_path.push('/');
            self.cwd_path.push_str(segment);
            debug!("Entered '{}'", self.cwd_path);
        }
        Ok(())
    }

    /// Direct children of `dir` in insertion order, as name/kind pairs.
    pub fn entries(&self, dir: NodeId) -> impl Iterator<Item = (&str, NodeKind)> {
        self.nodes
            .get(&dir)
            .into_iter()
            .flat_map(|node| node.children.iter())
            .filter_map(|child| self.nodes.get(child))
            .map(|node| (node.name.as_str(), node.kind))
    }

    /// Children of the first node carrying `name`, looked up anywhere in the
    /// tree by bare name. A file can match; it simply has no entries.
    pub fn list_named(
        &self,
        name: &str,
    ) -> Result<impl Iterator<Item = (&str, NodeKind)>, FilesystemError> {
        let id = self.find_by_name(name).context(NotFoundSnafu { path: name })?;
        Ok(self.entries(id))
    }

    /// Resolve `path` for reading: the node must exist and must not be a
    /// directory. Content itself comes from host storage, never from the
    /// node's payload.
    pub fn resolve_file(&self, path: &str) -> Result<NodeId, FilesystemError> {
        let id = self.find_node(path).context(FileNotFoundSnafu { path })?;
        ensure!(!self.is_directory(id), IsADirectorySnafu { path });
        Ok(id)
    }

    /// Re-parent the node at `source_path` under the directory at
    /// `destination_path`. No name collision check happens at the
    /// destination. Moving the cursor itself lands the cursor on the
    /// destination directory; moving one of its ancestors leaves the cached
    /// prompt path stale until the next recomputation.
    pub fn mv(
        &mut self,
        source_path: &str,
        destination_path: &str,
    ) -> Result<(), FilesystemError> {
        let source = self
            .find_node(source_path)
            .context(NotFoundSnafu { path: source_path })?;
        let destination = self
            .find_node(destination_path)
            .filter(|id| self.is_directory(*id))
            .context(NotADirectorySnafu {
                path: destination_path,
            })?;
        ensure!(
            destination != source && !self.is_descendant_of(destination, source),
            IntoOwnSubtreeSnafu { path: source_path }
        );

        self.detach(source);
        self.attach(source, destination);

        if self.cursor == source {
            self.cursor = destination;
            self.refresh_cwd_path();
        }
        debug!("Moved '{}' to '{}'", source_path, destination_path);
        Ok(())
    }

    /// Shallow copy: a new node carrying the source's name and kind, with no
    /// children and no payload, appended under the destination directory.
    pub fn cp(
        &mut self,
        source_path: &str,
        destination_path: &str,
    ) -> Result<NodeId, FilesystemError> {
        let source = self
            .find_node(source_path)
            .context(NotFoundSnafu { path: source_path })?;
        let destination = self
            .find_node(destination_path)
            .filter(|id| self.is_directory(*id))
            .context(NotADirectorySnafu {
                path: destination_path,
            })?;

        let (name, kind) = self
            .node(source)
            .map(|node| (node.name.clone(), node.kind))
            .context(NotFoundSnafu { path: source_path })?;
        let copy = self.insert_child(destination, &name, kind);
        debug!("Copied '{}' to '{}'", source_path, destination_path);
        Ok(copy)
    }

    /// Remove the node at `target_path` together with its whole subtree,
    /// children before parents. A cursor inside the removed subtree is reset
    /// to the target's former parent.
    pub fn rm(&mut self, target_path: &str) -> Result<(), FilesystemError> {
        let target = self
            .find_node(target_path)
            .context(NotFoundSnafu { path: target_path })?;
        let parent = self.nodes.get(&target).and_then(|node| node.parent);
        let cursor_removed =
            self.cursor == target || self.is_descendant_of(self.cursor, target);

        self.detach(target);
        for id in self.collect_subtree(target) {
            self.nodes.remove(&id);
        }

        if cursor_removed {
            if let Some(parent) = parent {
                self.cursor = parent;
                self.refresh_cwd_path();
            }
        }
        debug!("Removed '{}' and its subtree", target_path);
        Ok(())
    }

    fn insert_child(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = self.mint_id();
        self.nodes.insert(id, Node::new(name, kind, Some(parent)));
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }
        id
    }

    fn mint_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn is_directory(&self, id: NodeId) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|node| node.kind == NodeKind::Directory)
    }

    /// True when `id` sits strictly below `ancestor`.
    fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.nodes.get(&id).and_then(|node| node.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes.get(&parent).and_then(|node| node.parent);
        }
        false
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(&id).and_then(|node| node.parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|child| *child != id);
        }
    }

    fn attach(&mut self, id: NodeId, parent: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(parent);
        }
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }
    }

    /// Subtree members in post-order, children before their parent.
    fn collect_subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut collected = Vec::new();
        if let Some(node) = self.nodes.get(&id) {
            for child in &node.children {
                collected.extend(self.collect_subtree(*child));
            }
        }
        collected.push(id);
        collected
    }

    fn refresh_cwd_path(&mut self) {
        self.cwd_path = self.path_of(self.cursor).unwrap_or_default();
    }
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Snafu)]
pub enum FilesystemError {
    #[snafu(display("File exists"))]
    AlreadyExists { name: String },
    #[snafu(display("The system cannot find the path specified."))]
    PathNotFound,
    #[snafu(display("No such file or directory"))]
    NotFound { path: String },
    #[snafu(display("No such directory"))]
    NotADirectory { path: String },
    #[snafu(display("No such file"))]
    FileNotFound { path: String },
    #[snafu(display("Is a directory"))]
    IsADirectory { path: String },
    #[snafu(display("cannot move '{}' to a subdirectory of itself", path))]
    IntoOwnSubtree { path: String },
}
