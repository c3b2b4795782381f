use log::debug;

use crate::Camera;

macro_rules! passes {
    ([ $( $name:ident => $class:ident, )* ]) => {
        $( mod $name; )*
        $( pub use self::$name::*; )*

        #[derive(Debug)]
        pub struct CameraPasses {
            $( pub $name: $class, )*
        }

        impl CameraPasses {
            pub fn new(camera: &Camera) -> Self {
                debug!("Initializing camera passes");

                Self {
                    $( $name: $class::new(camera), )*
                }
            }
        }
    };
}

passes!([
    di_sampling => DiSamplingPass,
    di_spatial_resampling => DiSpatialResamplingPass,
    raster => RasterPass,
]);
