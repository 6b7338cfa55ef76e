//! # 원자적 쓰기 배치 (Write-Set)
//!
//! 여러 문서에 걸친 변경 사항을 하나의 원자적 커밋 단위로 누적하는
//! 순수 자료구조입니다. 정합성 엔진의 계획 함수들은 저장소 I/O 없이
//! 이 배치만을 생성하므로 라이브 저장소 없이 단위 테스트가 가능합니다.
//!
//! ## 배열 지시자
//!
//! `UpdateSpec`은 단순 필드 설정(`$set`) 외에 집합 의미론의 배열 지시자를
//! 지원합니다:
//!
//! - `array_union` → `$addToSet { $each }`: 이미 있는 값 추가는 무변화
//! - `array_remove` → `$pull { $in }`: 없는 값 제거는 무변화
//!
//! 두 지시자 모두 서버 측에서 커밋 시점에 적용되므로 호출자가 배열을
//! 읽어-수정-쓰기 할 필요가 없습니다.

use mongodb::bson::{oid::ObjectId, Bson, Document};

/// 단일 문서에 대한 부분 업데이트 명세
///
/// `$set` 필드 집합과 배열 지시자들을 누적하며, 같은 문서를 겨냥한
/// 여러 업데이트를 필드 단위로 병합할 수 있습니다. 병합은 서로 관련 없는
/// 필드를 덮어쓰지 않습니다 (같은 필드는 나중 값이 우선).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    /// `$set`으로 적용될 필드들
    set: Document,
    /// `$addToSet`으로 적용될 (필드, 값) 쌍들
    array_union: Vec<(String, Bson)>,
    /// `$pull`로 적용될 (필드, 값) 쌍들
    array_remove: Vec<(String, Bson)>,
}

impl UpdateSpec {
    /// 빈 업데이트 명세를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 주어진 `$set` 문서로 업데이트 명세를 생성합니다.
    pub fn from_set(set: Document) -> Self {
        Self {
            set,
            ..Self::default()
        }
    }

    /// 필드 하나를 `$set` 집합에 추가합니다. (빌더 스타일)
    pub fn set_field(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    /// 배열 필드에 값을 추가하는 지시자를 더합니다. (집합 합집합 의미론)
    pub fn array_union(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.array_union.push((field.into(), value.into()));
        self
    }

    /// 배열 필드에서 값을 제거하는 지시자를 더합니다. (집합 차집합 의미론)
    pub fn array_remove(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.array_remove.push((field.into(), value.into()));
        self
    }

    /// 다른 업데이트 명세를 이 명세에 필드 단위로 병합합니다.
    ///
    /// `$set` 필드는 키 단위로 합쳐지고(중복 키는 `other`가 우선),
    /// 배열 지시자들은 뒤에 이어 붙습니다.
    pub fn merge(&mut self, other: UpdateSpec) {
        for (key, value) in other.set {
            self.set.insert(key, value);
        }
        self.array_union.extend(other.array_union);
        self.array_remove.extend(other.array_remove);
    }

    /// 아무 변경도 담고 있지 않으면 true를 반환합니다.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.array_union.is_empty() && self.array_remove.is_empty()
    }

    /// `$set` 필드들에 대한 읽기 전용 접근자입니다.
    pub fn set_fields(&self) -> &Document {
        &self.set
    }

    /// MongoDB 업데이트 문서로 렌더링합니다.
    ///
    /// 같은 필드를 겨냥한 다중 union/remove 값은 `$each`/`$in`으로 묶입니다.
    ///
    /// ```text
    /// { "$set": { ... },
    ///   "$addToSet": { "collaborator_ids": { "$each": [ ... ] } },
    ///   "$pull": { "collaborator_ids": { "$in": [ ... ] } } }
    /// ```
    pub fn into_document(self) -> Document {
        let mut update = Document::new();

        if !self.set.is_empty() {
            update.insert("$set", self.set);
        }

        if !self.array_union.is_empty() {
            let mut add_to_set = Document::new();
            for (field, value) in self.array_union {
                append_directive_value(&mut add_to_set, field, "$each", value);
            }
            update.insert("$addToSet", add_to_set);
        }

        if !self.array_remove.is_empty() {
            let mut pull = Document::new();
            for (field, value) in self.array_remove {
                append_directive_value(&mut pull, field, "$in", value);
            }
            update.insert("$pull", pull);
        }

        update
    }
}

/// 필드별 지시자 문서(`{ field: { op: [values] } }`)에 값 하나를 추가합니다.
fn append_directive_value(directive: &mut Document, field: String, op: &str, value: Bson) {
    match directive.get_mut(&field) {
        Some(Bson::Document(values_doc)) => {
            if let Some(Bson::Array(values)) = values_doc.get_mut(op) {
                values.push(value);
            }
        }
        _ => {
            let mut values_doc = Document::new();
            values_doc.insert(op, vec![value]);
            directive.insert(field, values_doc);
        }
    }
}

/// 배치에 누적되는 개별 쓰기 연산
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// 문서 전체 삽입 (id는 사전 생성됨)
    Set {
        collection: &'static str,
        id: ObjectId,
        document: Document,
    },
    /// 문서 부분 업데이트
    Update {
        collection: &'static str,
        id: ObjectId,
        update: UpdateSpec,
    },
    /// 문서 삭제
    Delete {
        collection: &'static str,
        id: ObjectId,
    },
}

impl WriteOp {
    /// 이 연산이 겨냥하는 (컬렉션, 문서 id)를 반환합니다.
    pub fn target(&self) -> (&'static str, &ObjectId) {
        match self {
            WriteOp::Set { collection, id, .. } => (collection, id),
            WriteOp::Update { collection, id, .. } => (collection, id),
            WriteOp::Delete { collection, id } => (collection, id),
        }
    }
}

/// 원자적 다중 문서 쓰기 배치
///
/// 이미 읽어둔 데이터로부터 만들어진 쓰기 연산들의 순서 있는 목록입니다.
/// [`crate::store::commit`]이 전체를 하나의 트랜잭션으로 적용하므로
/// 전부 반영되거나 전부 반영되지 않습니다. 배치를 만드는 동안에는
/// 어떤 쓰기도 일어나지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// 빈 배치를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 문서 삽입 연산을 추가합니다.
    ///
    /// `document`에 `_id`가 없으면 주어진 id가 삽입됩니다.
    pub fn set(&mut self, collection: &'static str, id: ObjectId, mut document: Document) {
        if !document.contains_key("_id") {
            document.insert("_id", id);
        }
        self.ops.push(WriteOp::Set {
            collection,
            id,
            document,
        });
    }

    /// 부분 업데이트 연산을 추가합니다. 빈 업데이트는 무시됩니다.
    pub fn update(&mut self, collection: &'static str, id: ObjectId, update: UpdateSpec) {
        if update.is_empty() {
            return;
        }
        self.ops.push(WriteOp::Update {
            collection,
            id,
            update,
        });
    }

    /// 삭제 연산을 추가합니다.
    pub fn delete(&mut self, collection: &'static str, id: ObjectId) {
        self.ops.push(WriteOp::Delete { collection, id });
    }

    /// 누적된 연산이 없으면 true를 반환합니다.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// 누적된 연산 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// 누적된 연산들에 대한 읽기 전용 접근자입니다.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// 연산 목록을 소비하며 반환합니다.
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    /// 지정된 컬렉션에서 이 배치가 건드리는 문서 id들을 반환합니다.
    ///
    /// 커밋 후 캐시 무효화 키 목록을 만들 때 사용됩니다.
    pub fn touched_ids(&self, collection: &str) -> Vec<ObjectId> {
        self.ops
            .iter()
            .filter(|op| op.target().0 == collection)
            .map(|op| *op.target().1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_update_spec_renders_set_fields() {
        let spec = UpdateSpec::new()
            .set_field("department", "Engineering")
            .set_field("manager_id", "abc");

        let rendered = spec.into_document();
        let set = rendered.get_document("$set").unwrap();

        assert_eq!(set.get_str("department").unwrap(), "Engineering");
        assert_eq!(set.get_str("manager_id").unwrap(), "abc");
        assert!(!rendered.contains_key("$addToSet"));
        assert!(!rendered.contains_key("$pull"));
    }

    #[test]
    fn test_update_spec_renders_array_directives() {
        let spec = UpdateSpec::new()
            .array_union("collaborator_ids", "id-1")
            .array_union("collaborator_ids", "id-2")
            .array_remove("collaborator_ids", "id-3");

        let rendered = spec.into_document();

        let each = rendered
            .get_document("$addToSet")
            .unwrap()
            .get_document("collaborator_ids")
            .unwrap()
            .get_array("$each")
            .unwrap();
        assert_eq!(each.len(), 2);

        let pulled = rendered
            .get_document("$pull")
            .unwrap()
            .get_document("collaborator_ids")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(pulled.len(), 1);
        assert_eq!(pulled[0], Bson::String("id-3".to_string()));
    }

    #[test]
    fn test_update_spec_merge_keeps_unrelated_fields() {
        let mut spec = UpdateSpec::new().set_field("department", "Sales");
        spec.merge(UpdateSpec::new().set_field("manager_id", ""));

        let set = spec.into_document();
        let set = set.get_document("$set").unwrap();

        assert_eq!(set.get_str("department").unwrap(), "Sales");
        assert_eq!(set.get_str("manager_id").unwrap(), "");
    }

    #[test]
    fn test_update_spec_merge_later_value_wins_per_field() {
        let mut spec = UpdateSpec::new().set_field("department", "Sales");
        spec.merge(UpdateSpec::new().set_field("department", "Platform"));

        let set = spec.into_document();
        assert_eq!(
            set.get_document("$set").unwrap().get_str("department").unwrap(),
            "Platform"
        );
    }

    #[test]
    fn test_batch_skips_empty_updates() {
        let mut batch = WriteBatch::new();
        batch.update("departments", ObjectId::new(), UpdateSpec::new());

        assert!(batch.is_empty());
    }

    #[test]
    fn test_batch_set_injects_id() {
        let mut batch = WriteBatch::new();
        let id = ObjectId::new();
        batch.set("collaborators", id, doc! { "name": "Alice" });

        match &batch.ops()[0] {
            WriteOp::Set { document, .. } => {
                assert_eq!(document.get_object_id("_id").unwrap(), id);
            }
            other => panic!("Expected Set op, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_touched_ids_filters_by_collection() {
        let mut batch = WriteBatch::new();
        let collab_id = ObjectId::new();
        let dept_id = ObjectId::new();

        batch.delete("collaborators", collab_id);
        batch.update(
            "departments",
            dept_id,
            UpdateSpec::new().array_remove("collaborator_ids", collab_id.to_hex()),
        );

        assert_eq!(batch.touched_ids("collaborators"), vec![collab_id]);
        assert_eq!(batch.touched_ids("departments"), vec![dept_id]);
    }
}
