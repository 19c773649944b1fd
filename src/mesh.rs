use std::collections::HashMap;

use crate::vertex::Vertex;

/// Indexed triangle list of bare positions.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
  pub vertices: Vec<Vertex>,
  pub indices: Vec<u32>,
}

impl Mesh {
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Square of side `size` centred on the origin in the xy plane.
  pub fn quad(size: f32) -> Self {
    let h = size * 0.5;
    // 2   3
    //
    // 0   1
    Mesh {
      vertices: vec![
        Vertex::new(-h, -h, 0.0),
        Vertex::new(h, -h, 0.0),
        Vertex::new(-h, h, 0.0),
        Vertex::new(h, h, 0.0),
      ],
      indices: vec![0, 1, 2, 1, 3, 2],
    }
  }

  pub fn cube() -> Self {
    Mesh {
      vertices: vec![
        Vertex::new(-1.0, 1.0, 0.0),   // left bottom front
        Vertex::new(-1.0, 1.0, 1.0),   // left bottom back
        Vertex::new(-1.0, -1.0, 0.0),  // left top front
        Vertex::new(-1.0, -1.0, 1.0),  // left top back
        Vertex::new(1.0, 1.0, 0.0),    // right bottom front
        Vertex::new(1.0, 1.0, 1.0),    // right bottom back
        Vertex::new(1.0, -1.0, 0.0),   // right top front
        Vertex::new(1.0, -1.0, 1.0),   // right top back
      ],
      #[rustfmt::skip]
      indices: vec![
        0, 1, 5, 0, 5, 4, //bottom
        2, 7, 3, 2, 6, 7, //top
        0, 6, 2, 0, 4, 6, //front
        1, 3, 7, 1, 7, 5, //back
        0, 2, 1, 1, 2, 3, //left
        4, 5, 6, 5, 7, 6, //right
      ],
    }
  }

  pub fn icosahedron() -> Self {
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;
    Mesh {
      vertices: vec![
        Vertex::new(phi, -1.0, 0.0),
        Vertex::new(phi, 1.0, 0.0),
        Vertex::new(-phi, -1.0, 0.0),
        Vertex::new(-phi, 1.0, 0.0),
        Vertex::new(1.0, 0.0, -phi),
        Vertex::new(-1.0, 0.0, -phi),
        Vertex::new(1.0, 0.0, phi),
        Vertex::new(-1.0, 0.0, phi),
        Vertex::new(0.0, -phi, -1.0),
        Vertex::new(0.0, -phi, 1.0),
        Vertex::new(0.0, phi, -1.0),
        Vertex::new(0.0, phi, 1.0),
      ],
      #[rustfmt::skip]
      indices: vec![
        0, 9, 8,   0, 8, 4,   0, 4, 1,   0, 1, 6,   0, 6, 9,
        8, 9, 2,   8, 2, 5,   8, 5, 4,   4, 5, 10,  4, 10, 1,
        1, 10, 11, 1, 11, 6,  2, 3, 5,   2, 7, 3,   2, 9, 7,
        5, 3, 10,  3, 11, 10, 3, 7, 11,  6, 7, 9,   6, 11, 7,
      ],
    }
  }

  /// Splits every triangle into four through its edge midpoints. Midpoints
  /// of shared edges are created once.
  pub fn refine(&mut self) {
    let mut midpoints = HashMap::<(u32, u32), u32>::new();
    let mut indices = Vec::with_capacity(self.indices.len() * 4);
    let vertices = &mut self.vertices;
    let mut midpoint = |a: u32, b: u32| -> u32 {
      let key = (a.min(b), a.max(b));
      *midpoints.entry(key).or_insert_with(|| {
        let m = Vertex::midpoint(&vertices[a as usize], &vertices[b as usize]);
        vertices.push(m);
        (vertices.len() - 1) as u32
      })
    };
    for triangle in self.indices.chunks_exact(3) {
      let (a, b, c) = (triangle[0], triangle[1], triangle[2]);
      let ab = midpoint(a, b);
      let bc = midpoint(b, c);
      let ca = midpoint(c, a);
      indices.extend_from_slice(&[ca, a, ab, ab, b, bc, bc, c, ca, ab, bc, ca]);
    }
    self.indices = indices;
  }

  /// Unit sphere from an icosahedron refined `refinements` times.
  pub fn sphere(refinements: u32) -> Self {
    let mut mesh = Mesh::icosahedron();
    for _ in 0..refinements {
      mesh.refine();
    }
    for v in &mut mesh.vertices {
      v.position = v.position.normalize();
    }
    mesh
  }
}
