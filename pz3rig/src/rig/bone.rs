use crate::{Attribute, Error, Value};
use glam::{DMat3, DVec3};
use std::fmt;
use std::str::FromStr;

/// Strips the `:<digits>` suffix Poser appends to actor names (`lShldr:1` → `lShldr`).
pub fn strip_suffix(name: &str) -> &str {
    match name.rsplit_once(':') {
        Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => {
            head
        }
        _ => name,
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> DVec3 {
        match self {
            Self::X => DVec3::X,
            Self::Y => DVec3::Y,
            Self::Z => DVec3::Z,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'x' => Some(Self::X),
            'y' => Some(Self::Y),
            'z' => Some(Self::Z),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::X => 'x',
            Self::Y => 'y',
            Self::Z => 'z',
        }
    }
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next().and_then(Axis::from_char), chars.next()) {
            (Some(axis), None) => Ok(axis),
            _ => Err(Error::InvalidAxis {
                value: s.to_string(),
            }),
        }
    }
}

/// Order in which a bone's rotation channels are declared. The first axis is the twist
/// axis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RotationOrder {
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

impl RotationOrder {
    pub const ALL: [RotationOrder; 6] = [
        Self::Xyz,
        Self::Xzy,
        Self::Yxz,
        Self::Yzx,
        Self::Zxy,
        Self::Zyx,
    ];

    /// Parses a permutation of `xyz`, in either case.
    pub fn from_axes(axes: &str) -> Option<Self> {
        match axes.to_ascii_lowercase().as_str() {
            "xyz" => Some(Self::Xyz),
            "xzy" => Some(Self::Xzy),
            "yxz" => Some(Self::Yxz),
            "yzx" => Some(Self::Yzx),
            "zxy" => Some(Self::Zxy),
            "zyx" => Some(Self::Zyx),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xyz => "xyz",
            Self::Xzy => "xzy",
            Self::Yxz => "yxz",
            Self::Yzx => "yzx",
            Self::Zxy => "zxy",
            Self::Zyx => "zyx",
        }
    }

    pub fn axes(self) -> [Axis; 3] {
        use Axis::{X, Y, Z};
        match self {
            Self::Xyz => [X, Y, Z],
            Self::Xzy => [X, Z, Y],
            Self::Yxz => [Y, X, Z],
            Self::Yzx => [Y, Z, X],
            Self::Zxy => [Z, X, Y],
            Self::Zyx => [Z, Y, X],
        }
    }

    pub fn twist_axis(self) -> Axis {
        self.axes()[0]
    }
}

impl fmt::Display for RotationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bone of a figure, extracted from an `actor` block.
///
/// `parent`/`children` are indices into the owning [`crate::Armature`] and are only set
/// while the armature links its bones.
#[derive(Clone, Debug)]
pub struct Bone {
    /// Reference name without the `:<digits>` suffix.
    pub id: String,
    /// Reference name as written after `actor`.
    pub ref_name: String,
    /// First argument of the actor's `name` attribute.
    pub display_name: Option<String>,
    pub origin: DVec3,
    /// Euler angles in degrees, applied in fixed X, Y, Z order.
    pub orientation: DVec3,
    pub rotation_order: RotationOrder,
    pub endpoint: Option<DVec3>,
    /// Declared parent id (`nonInkyParent`, else `parent`), suffix stripped.
    pub parent_id: Option<String>,

    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) rotation: DMat3,
}

impl Bone {
    pub fn new(
        ref_name: impl Into<String>,
        origin: DVec3,
        orientation: DVec3,
        rotation_order: RotationOrder,
    ) -> Self {
        let ref_name = ref_name.into();
        Self {
            id: strip_suffix(&ref_name).to_string(),
            ref_name,
            display_name: None,
            origin,
            orientation,
            rotation_order,
            endpoint: None,
            parent_id: None,
            parent: None,
            children: Vec::new(),
            rotation: super::transform::euler_xyz(orientation),
        }
    }

    pub fn with_endpoint(mut self, endpoint: DVec3) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_parent_id(mut self, parent: &str) -> Self {
        self.parent_id = Some(strip_suffix(parent).to_string());
        self
    }

    /// Reads a bone from an `actor <ref> { ... }` attribute that has a body.
    pub fn from_actor(actor: &Attribute) -> Result<Self, Error> {
        let ref_name = actor.text(0)?;
        let origin = actor.unique_attribute("origin")?.vector3()?;
        let orientation = actor.unique_attribute("orientation")?.vector3()?;
        let rotation_order = rotation_order_of(actor, ref_name)?;

        let mut bone = Self::new(ref_name, origin, orientation, rotation_order);
        if actor.contains("endPoint") {
            bone.endpoint = Some(actor.unique_attribute("endPoint")?.vector3()?);
        }
        let parent_key = if actor.contains("nonInkyParent") {
            Some("nonInkyParent")
        } else if actor.contains("parent") {
            Some("parent")
        } else {
            None
        };
        if let Some(key) = parent_key {
            bone.parent_id = Some(strip_suffix(actor.unique_attribute(key)?.text(0)?).to_string());
        }
        bone.display_name = actor
            .all_attributes("name")?
            .next()
            .and_then(|name| name.arg(0))
            .and_then(|value| match value {
                Value::Text(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Object(_) => None,
            });
        Ok(bone)
    }

    pub fn parent_index(&self) -> Option<usize> {
        self.parent
    }

    pub fn child_indices(&self) -> &[usize] {
        &self.children
    }

    /// The endpoint, or the origin when the actor declares none.
    pub fn endpoint_or_origin(&self) -> DVec3 {
        self.endpoint.unwrap_or(self.origin)
    }
}

/// Collects the last letter of every `rotate*` channel in declaration order.
fn rotation_order_of(actor: &Attribute, bone: &str) -> Result<RotationOrder, Error> {
    let channels = actor.unique_attribute("channels")?;
    let order: String = channels
        .keys()?
        .into_iter()
        .filter(|key| key.starts_with("rotate"))
        .filter_map(|key| key.chars().last())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    RotationOrder::from_axes(&order).ok_or_else(|| Error::MalformedRotationOrder {
        bone: bone.to_string(),
        order,
    })
}
