//! # 디렉터리 정합성 계획 함수
//!
//! 협업자(`Collaborator`)와 부서(`Department`) 두 컬렉션의 상호 참조를
//! 정합하게 유지하기 위한 **순수 계획 함수**들입니다. 각 함수는
//! (현재 스냅샷, 요청된 변경) → write-set([`WriteBatch`]) 변환만 수행하며
//! 저장소 I/O를 전혀 하지 않으므로 라이브 저장소 없이 단위 테스트가
//! 가능합니다. 읽기와 커밋은 서비스 계층이 담당합니다.
//!
//! ## 유지하는 정합성 규칙
//!
//! - 협업자 C의 `department`가 부서 D의 이름이면 D의 `collaborator_ids`에
//!   C의 id가 있어야 하고, 그 역도 성립해야 합니다 (최선 노력,
//!   트랜잭션 간 보장은 아님)
//! - 부서 D에 관리자 M이 지정되어 있으면, D 소속원(M 제외)의 `manager_id`는
//!   M이어야 합니다. M 자신의 `manager_id`는 빈 문자열로 강제됩니다
//!   (부서 관리자는 그 관계 안에서 상급자를 갖지 않습니다)
//! - 어떤 연산 후에도 협업자의 `manager_id`는 자기 자신의 id와 같지 않습니다
//!
//! ## 알려진 한계 (의도된 동작)
//!
//! - 일괄 삭제([`plan_bulk_delete`])는 부서 측 정리를 생략합니다.
//!   대량 선택에서 id당 추가 읽기를 피하기 위한 단순화된 빠른 경로입니다.
//! - 협업자 편집과 부서 편집이 서로 반대편을 각자 고치는 두 경로는
//!   독립적으로 동작합니다. 배열 갱신이 집합 지시자로 표현되어 멱등하므로
//!   양쪽에서 같은 수정이 겹쳐도 결과는 같습니다.
//! - 모든 계획은 "읽은 시점의 스냅샷" 기준입니다. 서로 다른 클라이언트의
//!   동시 편집은 마지막 커밋이 이기며, 낙관적 버전 검사는 하지 않습니다.

use std::collections::BTreeMap;

use mongodb::bson::{oid::ObjectId, to_document, Bson, Document};

use crate::core::errors::AppError;
use crate::domain::entities::collaborators::collaborator::Collaborator;
use crate::domain::entities::departments::department::Department;
use crate::store::{UpdateSpec, WriteBatch};

/// 협업자 문서의 부서 이름 필드
const FIELD_DEPARTMENT: &str = "department";
/// 협업자/부서 문서의 관리자 id 필드
const FIELD_MANAGER_ID: &str = "manager_id";
/// 부서 문서의 소속원 id 집합 필드
const FIELD_COLLABORATOR_IDS: &str = "collaborator_ids";

/// 부서의 관리자 지정을 반영한 유효 `manager_id`를 계산합니다.
///
/// - 부서에 관리자 M이 있으면 M을 상속하되, 자기 자신이 M이면 빈 문자열
///   (자기 자신의 상급자가 될 수 없음)
/// - 부서에 관리자가 없으면 `fallback`(요청값 또는 기존값)을 그대로 사용
pub fn inherited_manager_id(department: &Department, self_id: &str, fallback: &str) -> String {
    if department.has_manager() {
        if department.manager_id == self_id {
            String::new()
        } else {
            department.manager_id.clone()
        }
    } else {
        fallback.to_string()
    }
}

/// 협업자 생성 write-set을 계산합니다.
///
/// id는 배치 안에서 부서 문서가 참조할 수 있도록 쓰기 전에 미리 생성되어
/// 들어옵니다. 대상 부서가 해석되어 있으면:
///
/// - 부서에 관리자가 기록되어 있으면 요청된 `manager_id`를 관리자 상속
///   규칙으로 덮어씁니다
/// - 부서의 `collaborator_ids`에 새 id를 합집합 지시자로 추가합니다
///
/// 부서가 없으면(`None`) 요청된 `manager_id`를 유지하고 부서 문서는
/// 건드리지 않습니다. 존재하지 않는 부서 이름은 에러가 아닙니다.
///
/// # 반환값
///
/// 유효 필드가 반영된 협업자와, 협업자 삽입 + (해당 시) 부서 갱신으로
/// 구성된 원자적 배치
pub fn plan_collaborator_create(
    new_id: ObjectId,
    mut collaborator: Collaborator,
    department: Option<&Department>,
) -> Result<(Collaborator, WriteBatch), AppError> {
    collaborator.id = Some(new_id);
    let self_hex = new_id.to_hex();

    if let Some(dept) = department {
        collaborator.manager_id = inherited_manager_id(dept, &self_hex, &collaborator.manager_id);
    }

    let document = to_document(&collaborator)
        .map_err(|e| AppError::InternalError(format!("협업자 직렬화 실패: {}", e)))?;

    let mut batch = WriteBatch::new();
    batch.set(Collaborator::COLLECTION, new_id, document);

    if let Some(dept) = department {
        if let Some(dept_id) = dept.id {
            batch.update(
                Department::COLLECTION,
                dept_id,
                UpdateSpec::new().array_union(FIELD_COLLABORATOR_IDS, self_hex),
            );
        }
    }

    Ok((collaborator, batch))
}

/// 협업자 단건 삭제 write-set을 계산합니다.
///
/// 소속 부서가 해석되어 있으면 `collaborator_ids`에서 id를 차집합 지시자로
/// 제거한 뒤 협업자 문서를 삭제합니다. 부서가 없으면 삭제만 수행합니다.
/// 이미 삭제된 id의 재삭제는 저장소 수준에서 무해한 no-op입니다.
pub fn plan_collaborator_delete(id: ObjectId, department: Option<&Department>) -> WriteBatch {
    let mut batch = WriteBatch::new();

    if let Some(dept) = department {
        if let Some(dept_id) = dept.id {
            batch.update(
                Department::COLLECTION,
                dept_id,
                UpdateSpec::new().array_remove(FIELD_COLLABORATOR_IDS, id.to_hex()),
            );
        }
    }

    batch.delete(Collaborator::COLLECTION, id);
    batch
}

/// 협업자 일괄 삭제 write-set을 계산합니다.
///
/// 단건 경로와 달리 부서 측 정리를 **수행하지 않습니다**. 대량 선택에서
/// id당 추가 읽기를 피하기 위해 정합성을 의도적으로 포기한 빠른 경로이며,
/// 부서 문서에 남는 고아 id는 문서화된 비정합 상태입니다.
pub fn plan_bulk_delete(ids: &[ObjectId]) -> WriteBatch {
    let mut batch = WriteBatch::new();
    for id in ids {
        batch.delete(Collaborator::COLLECTION, *id);
    }
    batch
}

/// 협업자 편집 시의 부서 이동 컨텍스트
///
/// `old`/`new`는 각각 이전/새 부서 이름을 해석한 결과입니다.
/// 해석 실패(존재하지 않는 이름)는 `None`으로 표현되며 에러가 아닙니다.
pub struct DepartmentMove<'a> {
    /// 기존 이름으로 해석된 이전 부서
    pub old: Option<&'a Department>,
    /// 새 이름으로 해석된 새 부서
    pub new: Option<&'a Department>,
}

/// 협업자 편집 write-set을 계산합니다.
///
/// `set_fields`는 요청에서 추려진 부분 필드들의 `$set` 문서입니다.
/// 부서 이동(`department_move`)이 있으면:
///
/// - `manager_id`를 생성 경로와 같은 상속 규칙으로 재계산해 `set_fields`에
///   덮어씁니다. 새 부서가 해석되지 않으면 빈 문자열로 강제됩니다
///   (무소속 협업자는 상급자도 갖지 않습니다)
/// - 이전 부서에서 id를 제거하고 새 부서에 id를 추가합니다
///
/// 모든 연산은 하나의 원자적 배치로 반환됩니다.
pub fn plan_collaborator_edit(
    id: ObjectId,
    current: &Collaborator,
    mut set_fields: Document,
    department_move: Option<DepartmentMove<'_>>,
) -> WriteBatch {
    let self_hex = id.to_hex();
    let mut batch = WriteBatch::new();

    if let Some(mv) = &department_move {
        // 부서가 바뀌면 관리자는 요청값이 아닌 새 부서 기준으로 재계산된다
        let fallback = set_fields
            .get_str(FIELD_MANAGER_ID)
            .map(str::to_string)
            .unwrap_or_else(|_| current.manager_id.clone());

        let manager_id = match mv.new {
            Some(dept) => inherited_manager_id(dept, &self_hex, &fallback),
            None => String::new(),
        };
        set_fields.insert(FIELD_MANAGER_ID, manager_id);
    }

    batch.update(
        Collaborator::COLLECTION,
        id,
        UpdateSpec::from_set(set_fields),
    );

    if let Some(mv) = department_move {
        if let Some(old) = mv.old {
            if let Some(old_id) = old.id {
                batch.update(
                    Department::COLLECTION,
                    old_id,
                    UpdateSpec::new().array_remove(FIELD_COLLABORATOR_IDS, self_hex.clone()),
                );
            }
        }
        if let Some(new) = mv.new {
            if let Some(new_id) = new.id {
                batch.update(
                    Department::COLLECTION,
                    new_id,
                    UpdateSpec::new().array_union(FIELD_COLLABORATOR_IDS, self_hex.clone()),
                );
            }
        }
    }

    batch
}

/// 부서 편집 요청의 부분 필드
///
/// 필드가 `None`이면 "변경 없음"입니다. `manager_id`의 `Some("")`은
/// 명시적 지정 해제이며, `collaborator_ids`의 `Some(vec![])`는 전원
/// 제외를 뜻합니다.
#[derive(Debug, Clone, Default)]
pub struct DepartmentPatch {
    /// 새 부서 이름 (빈 문자열은 무시됨)
    pub name: Option<String>,
    /// 새 부서 관리자 id
    pub manager_id: Option<String>,
    /// 새 소속원 id 목록 전체
    pub collaborator_ids: Option<Vec<String>>,
}

/// 부서 편집 계획
///
/// 부서 문서 자체의 갱신과, 영향을 받는 협업자별로 병합된 필드 패치를
/// 담습니다. 협업자 패치는 id 순서가 결정적이도록 `BTreeMap`으로 유지됩니다.
#[derive(Debug)]
pub struct DepartmentEditPlan {
    /// 부서 문서에 적용할 `$set` 필드 (요청이 제공한 필드만)
    pub department_update: Document,
    /// 협업자 id → 병합된 필드 패치
    pub collaborator_patches: BTreeMap<String, Document>,
    /// 편집 후 부서의 최종 이름
    pub final_name: String,
}

/// 부서 편집의 협업자 팬아웃을 계산합니다.
///
/// 하나의 부서 편집이 무제한 수의 협업자 문서 갱신을 함축할 수 있으므로,
/// 협업자별 패치는 **필드 단위로 병합**됩니다 (같은 편집에서 부서 이름
/// 패치와 관리자 패치를 둘 다 받을 수 있습니다). 누적 순서:
///
/// 1. 이름이 바뀌면: **최종** 소속 목록 전원에게 `department = 새 이름`.
///    이름이 그대로면: 새로 합류한 id들에게만 현재 이름을 스탬프
/// 2. 제외된 id들에게 `department = ""` (더 이상 어디에도 속하지 않음)
/// 3. 관리자가 바뀌면: 최종 소속 목록 전원에게 새 관리자 id를 스탬프하되,
///    새 관리자 본인은 빈 문자열 (자기 자신에게 관리될 수 없음)
///
/// 이 함수는 1차 팬아웃까지만 계산합니다. 다른 부서에서 이 부서로 끌어온
/// 협업자의 이전 소속 정리(추가 읽기가 필요한 단계)는
/// [`needs_stale_cleanup`]/[`stale_cleanup_op`]과 서비스 계층의 순차
/// 재조회로 이어집니다.
pub fn plan_department_edit(current: &Department, patch: &DepartmentPatch) -> DepartmentEditPlan {
    let requested_name = patch.name.as_deref().filter(|name| !name.is_empty());
    let final_name = requested_name.unwrap_or(&current.name).to_string();
    let name_changed = requested_name.is_some_and(|name| name != current.name);

    let new_manager = patch
        .manager_id
        .clone()
        .unwrap_or_else(|| current.manager_id.clone());
    let manager_changed = patch
        .manager_id
        .as_ref()
        .is_some_and(|manager| *manager != current.manager_id);

    let old_ids = &current.collaborator_ids;
    let final_ids: &[String] = patch
        .collaborator_ids
        .as_deref()
        .unwrap_or(old_ids);

    let removed_ids: Vec<&String> = old_ids
        .iter()
        .filter(|id| !final_ids.contains(id))
        .collect();

    // 부서 문서 자체의 부분 갱신 (요청이 제공한 필드만)
    let mut department_update = Document::new();
    if let Some(name) = requested_name {
        department_update.insert("name", name);
    }
    if let Some(manager_id) = &patch.manager_id {
        department_update.insert(FIELD_MANAGER_ID, manager_id.clone());
    }
    if let Some(ids) = &patch.collaborator_ids {
        department_update.insert(FIELD_COLLABORATOR_IDS, ids.clone());
    }

    let mut collaborator_patches: BTreeMap<String, Document> = BTreeMap::new();

    if name_changed {
        for id in final_ids {
            merge_patch(&mut collaborator_patches, id, FIELD_DEPARTMENT, final_name.clone().into());
        }
    } else {
        let added_ids = final_ids.iter().filter(|id| !old_ids.contains(id));
        for id in added_ids {
            merge_patch(&mut collaborator_patches, id, FIELD_DEPARTMENT, final_name.clone().into());
        }
    }

    for id in &removed_ids {
        merge_patch(&mut collaborator_patches, id, FIELD_DEPARTMENT, Bson::String(String::new()));
    }

    if manager_changed {
        for id in final_ids {
            let target = if *id == new_manager {
                String::new()
            } else {
                new_manager.clone()
            };
            merge_patch(&mut collaborator_patches, id, FIELD_MANAGER_ID, target.into());
        }
    }

    DepartmentEditPlan {
        department_update,
        collaborator_patches,
        final_name,
    }
}

/// 협업자 패치 누적기에 필드 하나를 병합합니다.
///
/// 기존에 누적된 다른 필드를 덮어쓰지 않습니다.
fn merge_patch(
    patches: &mut BTreeMap<String, Document>,
    collaborator_id: &str,
    field: &str,
    value: Bson,
) {
    patches
        .entry(collaborator_id.to_string())
        .or_default()
        .insert(field, value);
}

/// 해당 협업자 패치가 이전 소속 정리 검사를 필요로 하는지 판단합니다.
///
/// 패치가 협업자의 `department`를 편집 중인 부서의 (새) 이름으로 설정하는
/// 경우에만 true입니다. 이 부서의 소속 목록 편집으로 다른 부서에서
/// 끌려온 협업자일 수 있기 때문입니다.
pub fn needs_stale_cleanup(patch: &Document, final_name: &str) -> bool {
    patch
        .get_str(FIELD_DEPARTMENT)
        .map(|department| !department.is_empty() && department == final_name)
        .unwrap_or(false)
}

/// 이전 소속 부서에서의 제거 연산을 계산합니다.
///
/// 협업자의 커밋 전 저장 상태가 가리키던 부서(`other_department`)가
/// 편집 중인 부서와 **다른** 실제 문서로 해석된 경우에만, 그 부서의
/// `collaborator_ids`에서 협업자 id를 제거하는 연산을 반환합니다.
pub fn stale_cleanup_op(
    edited_department_id: &ObjectId,
    other_department: &Department,
    collaborator_id: &str,
) -> Option<(ObjectId, UpdateSpec)> {
    let other_id = other_department.id?;
    if other_id == *edited_department_id {
        return None;
    }
    Some((
        other_id,
        UpdateSpec::new().array_remove(FIELD_COLLABORATOR_IDS, collaborator_id.to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::collaborators::collaborator::Level;
    use crate::store::WriteOp;
    use mongodb::bson::DateTime;

    fn department(name: &str, manager_id: &str, collaborator_ids: &[&str]) -> Department {
        Department {
            id: Some(ObjectId::new()),
            name: name.to_string(),
            manager_id: manager_id.to_string(),
            collaborator_ids: collaborator_ids.iter().map(|id| id.to_string()).collect(),
            created_at: DateTime::now(),
        }
    }

    fn collaborator(name: &str, dept: &str, manager_id: &str) -> Collaborator {
        Collaborator::new(
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
            dept.to_string(),
            "Engineer".to_string(),
            "2024-01-15".to_string(),
            Level::Mid,
            manager_id.to_string(),
            "7000".to_string(),
            true,
        )
    }

    fn update_ops_for<'a>(batch: &'a WriteBatch, collection: &str) -> Vec<&'a WriteOp> {
        batch
            .ops()
            .iter()
            .filter(|op| matches!(op, WriteOp::Update { collection: c, .. } if *c == collection))
            .collect()
    }

    // --- 협업자 생성 ---

    #[test]
    fn test_create_adds_membership_to_existing_department() {
        // "Engineering"이 존재하고 비어 있을 때 Alice를 생성하면
        // Alice 문서 삽입과 Engineering 멤버십 추가가 한 배치가 된다
        let engineering = department("Engineering", "", &[]);
        let new_id = ObjectId::new();

        let (alice, batch) =
            plan_collaborator_create(new_id, collaborator("Alice", "Engineering", ""), Some(&engineering))
                .unwrap();

        assert_eq!(alice.department, "Engineering");
        assert_eq!(alice.manager_id, "");
        assert_eq!(batch.len(), 2);

        match &batch.ops()[0] {
            WriteOp::Set { collection, document, .. } => {
                assert_eq!(*collection, Collaborator::COLLECTION);
                assert_eq!(document.get_str("department").unwrap(), "Engineering");
                assert_eq!(document.get_object_id("_id").unwrap(), new_id);
            }
            other => panic!("Expected Set, got {:?}", other),
        }

        match &batch.ops()[1] {
            WriteOp::Update { collection, id, update } => {
                assert_eq!(*collection, Department::COLLECTION);
                assert_eq!(*id, engineering.id.unwrap());
                let rendered = update.clone().into_document();
                let each = rendered
                    .get_document("$addToSet").unwrap()
                    .get_document("collaborator_ids").unwrap()
                    .get_array("$each").unwrap();
                assert_eq!(each[0], Bson::String(new_id.to_hex()));
            }
            other => panic!("Expected Update, got {:?}", other),
        }
    }

    #[test]
    fn test_create_inherits_department_manager() {
        // 부서에 관리자 Bob이 있으면 요청된 manager_id("")는 Bob으로 덮어써진다
        let bob = ObjectId::new().to_hex();
        let engineering = department("Engineering", &bob, &[]);

        let (carol, _) =
            plan_collaborator_create(ObjectId::new(), collaborator("Carol", "Engineering", ""), Some(&engineering))
                .unwrap();

        assert_eq!(carol.manager_id, bob);
    }

    #[test]
    fn test_create_self_department_manager_gets_no_manager() {
        // 부서 관리자가 새 협업자 자신이면 manager_id는 빈 문자열로 강제된다
        let new_id = ObjectId::new();
        let engineering = department("Engineering", &new_id.to_hex(), &[]);

        let (collab, _) =
            plan_collaborator_create(new_id, collaborator("Dana", "Engineering", ""), Some(&engineering))
                .unwrap();

        assert_eq!(collab.manager_id, "");
        assert!(!collab.is_own_manager());
    }

    #[test]
    fn test_create_keeps_requested_manager_when_department_missing() {
        // 부서가 해석되지 않으면 요청된 manager_id를 유지하고 부서는 건드리지 않는다
        let requested = ObjectId::new().to_hex();

        let (collab, batch) =
            plan_collaborator_create(ObjectId::new(), collaborator("Eve", "Ghost Dept", &requested), None)
                .unwrap();

        assert_eq!(collab.manager_id, requested);
        assert_eq!(batch.len(), 1);
        assert!(matches!(batch.ops()[0], WriteOp::Set { .. }));
    }

    #[test]
    fn test_create_keeps_requested_manager_when_department_has_none() {
        // 부서는 있지만 관리자가 없으면 요청된 manager_id가 유지된다
        let requested = ObjectId::new().to_hex();
        let sales = department("Sales", "", &[]);

        let (collab, _) =
            plan_collaborator_create(ObjectId::new(), collaborator("Frank", "Sales", &requested), Some(&sales))
                .unwrap();

        assert_eq!(collab.manager_id, requested);
    }

    // --- 협업자 삭제 ---

    #[test]
    fn test_delete_removes_membership_then_deletes() {
        let id = ObjectId::new();
        let engineering = department("Engineering", "", &[&id.to_hex()]);

        let batch = plan_collaborator_delete(id, Some(&engineering));

        assert_eq!(batch.len(), 2);
        match &batch.ops()[0] {
            WriteOp::Update { collection, update, .. } => {
                assert_eq!(*collection, Department::COLLECTION);
                let rendered = update.clone().into_document();
                let pulled = rendered
                    .get_document("$pull").unwrap()
                    .get_document("collaborator_ids").unwrap()
                    .get_array("$in").unwrap();
                assert_eq!(pulled[0], Bson::String(id.to_hex()));
            }
            other => panic!("Expected Update, got {:?}", other),
        }
        assert!(matches!(
            &batch.ops()[1],
            WriteOp::Delete { collection, .. } if *collection == Collaborator::COLLECTION
        ));
    }

    #[test]
    fn test_delete_without_department_only_deletes() {
        let batch = plan_collaborator_delete(ObjectId::new(), None);

        assert_eq!(batch.len(), 1);
        assert!(matches!(batch.ops()[0], WriteOp::Delete { .. }));
    }

    #[test]
    fn test_bulk_delete_skips_department_cleanup() {
        // 일괄 경로는 부서 문서를 전혀 건드리지 않는다 - 문서화된 빠른 경로
        let ids = vec![ObjectId::new(), ObjectId::new(), ObjectId::new()];

        let batch = plan_bulk_delete(&ids);

        assert_eq!(batch.len(), 3);
        assert!(batch
            .ops()
            .iter()
            .all(|op| matches!(op, WriteOp::Delete { collection, .. } if *collection == Collaborator::COLLECTION)));
        assert!(batch.touched_ids(Department::COLLECTION).is_empty());
    }

    // --- 협업자 편집 ---

    #[test]
    fn test_edit_moves_between_departments_and_inherits_manager() {
        // Alice를 Engineering → Sales(관리자 Eve)로 이동:
        // Engineering에서 제거, Sales에 추가, manager_id는 Eve로 재계산
        let id = ObjectId::new();
        let eve = ObjectId::new().to_hex();
        let engineering = department("Engineering", "", &[&id.to_hex()]);
        let sales = department("Sales", &eve, &[]);
        let current = collaborator("Alice", "Engineering", "");

        let mut set_fields = Document::new();
        set_fields.insert("department", "Sales");

        let batch = plan_collaborator_edit(
            id,
            &current,
            set_fields,
            Some(DepartmentMove {
                old: Some(&engineering),
                new: Some(&sales),
            }),
        );

        assert_eq!(batch.len(), 3);

        match &batch.ops()[0] {
            WriteOp::Update { collection, update, .. } => {
                assert_eq!(*collection, Collaborator::COLLECTION);
                assert_eq!(update.set_fields().get_str("department").unwrap(), "Sales");
                assert_eq!(update.set_fields().get_str("manager_id").unwrap(), eve);
            }
            other => panic!("Expected Update, got {:?}", other),
        }

        let dept_ops = update_ops_for(&batch, Department::COLLECTION);
        assert_eq!(dept_ops.len(), 2);
    }

    #[test]
    fn test_edit_to_missing_department_clears_manager() {
        // 새 부서가 해석되지 않으면 무소속이 되고 manager_id는 빈 문자열로 강제
        let id = ObjectId::new();
        let engineering = department("Engineering", "", &[&id.to_hex()]);
        let current = collaborator("Alice", "Engineering", &ObjectId::new().to_hex());

        let mut set_fields = Document::new();
        set_fields.insert("department", "Nonexistent");

        let batch = plan_collaborator_edit(
            id,
            &current,
            set_fields,
            Some(DepartmentMove {
                old: Some(&engineering),
                new: None,
            }),
        );

        match &batch.ops()[0] {
            WriteOp::Update { update, .. } => {
                assert_eq!(update.set_fields().get_str("manager_id").unwrap(), "");
            }
            other => panic!("Expected Update, got {:?}", other),
        }
        // 새 부서 추가 연산은 없어야 한다
        assert_eq!(update_ops_for(&batch, Department::COLLECTION).len(), 1);
    }

    #[test]
    fn test_edit_into_department_managed_by_self() {
        // 이동한 부서의 관리자가 본인이면 manager_id는 빈 문자열
        let id = ObjectId::new();
        let platform = department("Platform", &id.to_hex(), &[]);
        let current = collaborator("Grace", "Engineering", "");

        let batch = plan_collaborator_edit(
            id,
            &current,
            Document::new(),
            Some(DepartmentMove {
                old: None,
                new: Some(&platform),
            }),
        );

        match &batch.ops()[0] {
            WriteOp::Update { update, .. } => {
                assert_eq!(update.set_fields().get_str("manager_id").unwrap(), "");
            }
            other => panic!("Expected Update, got {:?}", other),
        }
    }

    #[test]
    fn test_edit_without_department_change_touches_only_collaborator() {
        let id = ObjectId::new();
        let current = collaborator("Alice", "Engineering", "");

        let mut set_fields = Document::new();
        set_fields.insert("job_title", "Staff Engineer");

        let batch = plan_collaborator_edit(id, &current, set_fields, None);

        assert_eq!(batch.len(), 1);
        match &batch.ops()[0] {
            WriteOp::Update { collection, update, .. } => {
                assert_eq!(*collection, Collaborator::COLLECTION);
                // 관리자 필드는 건드리지 않는다
                assert!(update.set_fields().get_str("manager_id").is_err());
            }
            other => panic!("Expected Update, got {:?}", other),
        }
    }

    // --- 부서 편집 팬아웃 ---

    #[test]
    fn test_department_rename_stamps_final_membership() {
        // Engineering → Platform 개명: 최종 소속원 전원의 department가 바뀐다
        let alice = ObjectId::new().to_hex();
        let carol = ObjectId::new().to_hex();
        let current = department("Engineering", "", &[&alice, &carol]);

        let plan = plan_department_edit(
            &current,
            &DepartmentPatch {
                name: Some("Platform".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(plan.final_name, "Platform");
        assert_eq!(plan.department_update.get_str("name").unwrap(), "Platform");
        assert_eq!(plan.collaborator_patches.len(), 2);
        for id in [&alice, &carol] {
            assert_eq!(
                plan.collaborator_patches[id.as_str()].get_str("department").unwrap(),
                "Platform"
            );
        }
    }

    #[test]
    fn test_department_edit_stamps_only_new_members_when_name_unchanged() {
        let existing = ObjectId::new().to_hex();
        let joining = ObjectId::new().to_hex();
        let current = department("Engineering", "", &[&existing]);

        let plan = plan_department_edit(
            &current,
            &DepartmentPatch {
                collaborator_ids: Some(vec![existing.clone(), joining.clone()]),
                ..Default::default()
            },
        );

        // 기존 멤버는 패치 대상이 아니다
        assert!(!plan.collaborator_patches.contains_key(&existing));
        assert_eq!(
            plan.collaborator_patches[&joining].get_str("department").unwrap(),
            "Engineering"
        );
    }

    #[test]
    fn test_department_edit_clears_removed_members() {
        let staying = ObjectId::new().to_hex();
        let leaving = ObjectId::new().to_hex();
        let current = department("Engineering", "", &[&staying, &leaving]);

        let plan = plan_department_edit(
            &current,
            &DepartmentPatch {
                collaborator_ids: Some(vec![staying.clone()]),
                ..Default::default()
            },
        );

        assert_eq!(
            plan.collaborator_patches[&leaving].get_str("department").unwrap(),
            ""
        );
        assert!(!plan.collaborator_patches.contains_key(&staying));
    }

    #[test]
    fn test_department_manager_change_excludes_new_manager() {
        // 관리자 교체: 최종 소속원 전원에게 스탬프하되 새 관리자 본인은 해제
        let lead = ObjectId::new().to_hex();
        let member = ObjectId::new().to_hex();
        let current = department("Engineering", "", &[&lead, &member]);

        let plan = plan_department_edit(
            &current,
            &DepartmentPatch {
                manager_id: Some(lead.clone()),
                ..Default::default()
            },
        );

        assert_eq!(plan.collaborator_patches[&lead].get_str("manager_id").unwrap(), "");
        assert_eq!(
            plan.collaborator_patches[&member].get_str("manager_id").unwrap(),
            lead
        );
    }

    #[test]
    fn test_department_manager_clear_propagates_to_membership() {
        let bob = ObjectId::new().to_hex();
        let member = ObjectId::new().to_hex();
        let current = department("Engineering", &bob, &[&member]);

        let plan = plan_department_edit(
            &current,
            &DepartmentPatch {
                manager_id: Some(String::new()),
                ..Default::default()
            },
        );

        assert_eq!(
            plan.collaborator_patches[&member].get_str("manager_id").unwrap(),
            ""
        );
    }

    #[test]
    fn test_department_rename_and_manager_change_merge_per_collaborator() {
        // 같은 편집에서 이름 패치와 관리자 패치가 협업자별로 병합된다
        let lead = ObjectId::new().to_hex();
        let member = ObjectId::new().to_hex();
        let current = department("Engineering", "", &[&lead, &member]);

        let plan = plan_department_edit(
            &current,
            &DepartmentPatch {
                name: Some("Platform".to_string()),
                manager_id: Some(lead.clone()),
                ..Default::default()
            },
        );

        let member_patch = &plan.collaborator_patches[&member];
        assert_eq!(member_patch.get_str("department").unwrap(), "Platform");
        assert_eq!(member_patch.get_str("manager_id").unwrap(), lead);

        let lead_patch = &plan.collaborator_patches[&lead];
        assert_eq!(lead_patch.get_str("department").unwrap(), "Platform");
        assert_eq!(lead_patch.get_str("manager_id").unwrap(), "");
    }

    #[test]
    fn test_department_edit_with_no_changes_is_empty() {
        let member = ObjectId::new().to_hex();
        let current = department("Engineering", "", &[&member]);

        let plan = plan_department_edit(&current, &DepartmentPatch::default());

        assert!(plan.department_update.is_empty());
        assert!(plan.collaborator_patches.is_empty());
        assert_eq!(plan.final_name, "Engineering");
    }

    #[test]
    fn test_department_edit_same_values_cause_no_fanout() {
        // 저장된 값과 같은 이름/관리자를 다시 제출해도 팬아웃은 없다
        let bob = ObjectId::new().to_hex();
        let member = ObjectId::new().to_hex();
        let current = department("Engineering", &bob, &[&member]);

        let plan = plan_department_edit(
            &current,
            &DepartmentPatch {
                name: Some("Engineering".to_string()),
                manager_id: Some(bob.clone()),
                collaborator_ids: Some(vec![member.clone()]),
            },
        );

        assert!(plan.collaborator_patches.is_empty());
        // 부서 문서 갱신 자체는 제공된 필드 그대로 적용된다
        assert_eq!(plan.department_update.get_str("name").unwrap(), "Engineering");
    }

    // --- 이전 소속 정리 ---

    #[test]
    fn test_needs_stale_cleanup_only_for_final_name_stamp() {
        let mut joining_patch = Document::new();
        joining_patch.insert("department", "Platform");
        assert!(needs_stale_cleanup(&joining_patch, "Platform"));

        let mut removed_patch = Document::new();
        removed_patch.insert("department", "");
        assert!(!needs_stale_cleanup(&removed_patch, "Platform"));

        let mut manager_only_patch = Document::new();
        manager_only_patch.insert("manager_id", "abc");
        assert!(!needs_stale_cleanup(&manager_only_patch, "Platform"));
    }

    #[test]
    fn test_stale_cleanup_removes_from_other_department() {
        let edited_id = ObjectId::new();
        let other = department("Sales", "", &["some-collab"]);
        let collab_id = ObjectId::new().to_hex();

        let (target, update) = stale_cleanup_op(&edited_id, &other, &collab_id).unwrap();

        assert_eq!(target, other.id.unwrap());
        let rendered = update.into_document();
        let pulled = rendered
            .get_document("$pull").unwrap()
            .get_document("collaborator_ids").unwrap()
            .get_array("$in").unwrap();
        assert_eq!(pulled[0], Bson::String(collab_id));
    }

    #[test]
    fn test_stale_cleanup_skips_edited_department_itself() {
        let other = department("Engineering", "", &[]);
        let edited_id = other.id.unwrap();

        assert!(stale_cleanup_op(&edited_id, &other, "collab").is_none());
    }

    // --- 관리자 상속 규칙 ---

    #[test]
    fn test_inherited_manager_id_rules() {
        let bob = ObjectId::new().to_hex();
        let with_manager = department("Engineering", &bob, &[]);
        let without_manager = department("Sales", "", &[]);

        // 관리자가 있으면 상속
        assert_eq!(inherited_manager_id(&with_manager, "someone-else", "req"), bob);
        // 본인이 관리자면 해제
        assert_eq!(inherited_manager_id(&with_manager, &bob, "req"), "");
        // 관리자가 없으면 요청값 유지
        assert_eq!(inherited_manager_id(&without_manager, "someone", "req"), "req");
    }
}
