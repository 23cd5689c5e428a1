//! Which cache keys a write has to drop.
//!
//! Every write path describes what it changed as a [`Mutation`]; the keys to
//! remove come from [`RULES`] alone.

use mongodb::bson::oid::ObjectId;

use super::CacheKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Blog,
    Comment,
    Like,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    /// The "all blogs" list.
    List,
    /// The detail entry of the affected blog.
    Detail,
}

use Entity::*;
use KeyScope::*;
use WriteOp::*;

pub const RULES: &[(Entity, WriteOp, &[KeyScope])] = &[
    (Blog, Create, &[List]),
    (Blog, Update, &[List, Detail]),
    (Blog, Delete, &[List, Detail]),
    // counters on the parent blog change
    (Comment, Create, &[List, Detail]),
    (Comment, Update, &[]),
    (Comment, Delete, &[List, Detail]),
    (Like, Create, &[List, Detail]),
    (Like, Update, &[]),
    (Like, Delete, &[List, Detail]),
];

/// A completed write against `blog` (the blog itself, or the parent of a
/// comment or like).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub entity: Entity,
    pub op: WriteOp,
    pub blog: ObjectId,
}

impl Mutation {
    pub fn new(entity: Entity, op: WriteOp, blog: ObjectId) -> Self {
        Self { entity, op, blog }
    }

    pub fn blog_created(blog: ObjectId) -> Self {
        Self::new(Blog, Create, blog)
    }

    pub fn blog_updated(blog: ObjectId) -> Self {
        Self::new(Blog, Update, blog)
    }

    pub fn blog_deleted(blog: ObjectId) -> Self {
        Self::new(Blog, Delete, blog)
    }

    pub fn comment_created(blog: ObjectId) -> Self {
        Self::new(Comment, Create, blog)
    }

    pub fn comment_deleted(blog: ObjectId) -> Self {
        Self::new(Comment, Delete, blog)
    }

    pub fn like_created(blog: ObjectId) -> Self {
        Self::new(Like, Create, blog)
    }

    pub fn like_deleted(blog: ObjectId) -> Self {
        Self::new(Like, Delete, blog)
    }

    pub fn scopes(&self) -> &'static [KeyScope] {
        RULES
            .iter()
            .find(|(entity, op, _)| *entity == self.entity && *op == self.op)
            .map(|(_, _, scopes)| *scopes)
            .unwrap_or(&[])
    }

    pub fn keys(&self) -> Vec<CacheKey> {
        self.scopes()
            .iter()
            .map(|scope| match scope {
                List => CacheKey::BlogList,
                Detail => CacheKey::Blog(self.blog),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entity_and_op_has_a_rule() {
        for entity in [Blog, Comment, Like] {
            for op in [Create, Update, Delete] {
                let count = RULES
                    .iter()
                    .filter(|(e, o, _)| *e == entity && *o == op)
                    .count();
                assert_eq!(count, 1, "{entity:?} {op:?}");
            }
        }
    }

    #[test]
    fn blog_create_only_drops_the_list() {
        let id = ObjectId::new();
        assert_eq!(Mutation::blog_created(id).keys(), vec![CacheKey::BlogList]);
    }

    #[test]
    fn blog_update_and_delete_drop_list_and_detail() {
        let id = ObjectId::new();
        let expected = vec![CacheKey::BlogList, CacheKey::Blog(id)];
        assert_eq!(Mutation::blog_updated(id).keys(), expected);
        assert_eq!(Mutation::blog_deleted(id).keys(), expected);
    }

    #[test]
    fn child_writes_drop_the_parent_detail() {
        let id = ObjectId::new();
        for mutation in [
            Mutation::comment_created(id),
            Mutation::comment_deleted(id),
            Mutation::like_created(id),
            Mutation::like_deleted(id),
        ] {
            assert!(mutation.keys().contains(&CacheKey::Blog(id)), "{mutation:?}");
        }
        assert!(Mutation::new(Comment, Update, id).keys().is_empty());
    }
}
