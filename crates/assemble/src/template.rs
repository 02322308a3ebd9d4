//! Base vertex/fragment templates carrying the injection-point markers.

/// GLSL base template for the vertex stage. Effect fragments splice at the
/// `//#inject` markers; uniform/varying declarations are prepended above this.
pub const VERTEX_TEMPLATE: &str = r#"uniform mat4 modelMatrix;
uniform mat4 modelViewMatrix;
uniform mat4 projectionMatrix;
attribute vec3 position;
attribute vec3 normal;
attribute vec2 uv;
//#inject declarations

void main() {
    //#inject vertex_setup
    vec3 transformed = position;
    //#inject vertex_displace
    gl_Position = projectionMatrix * modelViewMatrix * vec4(transformed, 1.0);
    //#inject vertex_post
}
"#;

/// GLSL base template for the fragment stage.
pub const FRAGMENT_TEMPLATE: &str = r#"precision highp float;
uniform sampler2D map;
//#inject declarations

void main() {
    //#inject fragment_setup
    vec4 baseColor = texture2D(map, vUv);
    //#inject fragment_color
    gl_FragColor = baseColor;
    //#inject fragment_post
}
"#;

/// A pair of stage templates the assembler splices into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramTemplate {
    pub vertex: String,
    pub fragment: String,
}

impl ProgramTemplate {
    /// The built-in base templates.
    pub fn standard() -> Self {
        Self {
            vertex: VERTEX_TEMPLATE.to_owned(),
            fragment: FRAGMENT_TEMPLATE.to_owned(),
        }
    }

    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderweave_registry::points;

    #[test]
    fn standard_templates_carry_all_markers() {
        let t = ProgramTemplate::standard();
        for marker in [
            points::DECLARATIONS,
            points::VERTEX_SETUP,
            points::VERTEX_DISPLACE,
            points::VERTEX_POST,
        ] {
            assert!(t.vertex.contains(marker), "vertex missing {marker}");
        }
        for marker in [
            points::DECLARATIONS,
            points::FRAGMENT_SETUP,
            points::FRAGMENT_COLOR,
            points::FRAGMENT_POST,
        ] {
            assert!(t.fragment.contains(marker), "fragment missing {marker}");
        }
    }
}
